//! Event entity - A scheduled church activity.
//!
//! Events may be open for registration and may carry a cap on the total number
//! of attendees. Registrations reference events by id only; there is no foreign
//! key, so deleting an event leaves its registrations in place.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Event database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// UUID assigned on creation
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Short title shown in listings
    pub title: String,
    /// Long description
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Day the event takes place
    pub date: Date,
    /// Start time, `HH:MM` 24-hour
    pub start_time: String,
    /// End time, `HH:MM` 24-hour
    pub end_time: String,
    /// Where the event takes place
    pub location: String,
    /// Optional banner image
    pub image_url: Option<String>,
    /// Whether the public registration form accepts submissions
    pub registration_enabled: bool,
    /// Cap on the summed `number_of_attendees`; `None` means unlimited
    pub max_attendees: Option<i32>,
    /// When the event was created
    pub created_at: DateTimeUtc,
}

/// Registrations join to events by value, see module docs
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
