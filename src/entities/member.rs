//! Member entity - A person on the church roster.
//!
//! Members are created through the membership application form. A member is
//! either an individual or a family record; family records usually carry a
//! spouse name, an anniversary date and a list of children.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of membership a person applied for
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum MembershipType {
    /// A single person
    #[sea_orm(string_value = "individual")]
    Individual,
    /// A household
    #[sea_orm(string_value = "family")]
    Family,
}

/// Member database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "members")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// UUID assigned when the application was accepted
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Individual or family membership
    pub membership_type: MembershipType,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Contact email, also the login name (not unique)
    pub email: String,
    /// Contact phone number
    pub phone: String,
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// State or region
    pub state: String,
    /// Postal code
    pub zip_code: String,
    /// Date of birth, drives the birthday occurrences on the calendar
    pub birth_date: Date,
    /// Argon2 PHC string; never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Spouse name for family memberships
    pub spouse_name: Option<String>,
    /// Wedding date, drives the anniversary occurrences on the calendar
    pub anniversary_date: Option<Date>,
    /// Free-form list of children, e.g. `"Emma (12), Jacob (8)"`
    pub children: Option<String>,
    /// Ministries the member would like to serve in
    pub ministry_interests: Option<String>,
    /// Admin notes
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    /// When the application was submitted
    pub created_at: DateTimeUtc,
}

/// Members are not related to other tables
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// First and last name joined with a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
