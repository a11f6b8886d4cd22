//! Registration entity - A sign-up attaching one or more attendees to an event.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Registration database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "registrations")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// UUID assigned on submission
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Id of the event this registration is for
    pub event_id: String,
    /// Registrant given name
    pub first_name: String,
    /// Registrant family name
    pub last_name: String,
    /// Registrant email
    pub email: String,
    /// Registrant phone
    pub phone: String,
    /// Seats taken by this registration, at least 1
    pub number_of_attendees: i32,
    /// Dietary needs, children's ages and the like
    #[sea_orm(column_type = "Text", nullable)]
    pub special_requests: Option<String>,
    /// When the registration was submitted
    pub created_at: DateTimeUtc,
}

/// Registrations join to events by value
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
