//! Event business logic - Handles all church event operations.
//!
//! Events are always returned in ascending date order (ties broken by start time,
//! then creation time), so callers never have to re-sort after a write. Times are
//! kept as `HH:MM` strings and validated on every create and update.

use crate::{
    core::{
        capacity::{self, SlotLocks},
        new_id, required,
        update::double_option,
    },
    entities::{Event, event},
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveTime, Utc};
use sea_orm::{PaginatorTrait, QueryOrder, Select, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Fields submitted by the admin "add event" form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    /// Event title
    pub title: String,
    /// Event description
    #[serde(default)]
    pub description: String,
    /// Day of the event
    pub date: NaiveDate,
    /// Start time, `HH:MM`
    pub start_time: String,
    /// End time, `HH:MM`
    pub end_time: String,
    /// Venue
    pub location: String,
    /// Optional banner image
    #[serde(default)]
    pub image_url: Option<String>,
    /// Whether the public registration form is open
    #[serde(default)]
    pub registration_enabled: bool,
    /// Attendee cap; `None` or `0` means unlimited
    #[serde(default)]
    pub max_attendees: Option<i32>,
}

/// Field-level changes to an event. Unset fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New date
    pub date: Option<NaiveDate>,
    /// New start time
    pub start_time: Option<String>,
    /// New end time
    pub end_time: Option<String>,
    /// New location
    pub location: Option<String>,
    /// `Some(None)` removes the image
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    /// Open or close registration
    pub registration_enabled: Option<bool>,
    /// `Some(None)` (or `Some(Some(0))`) removes the cap
    #[serde(default, deserialize_with = "double_option")]
    pub max_attendees: Option<Option<i32>>,
}

fn parse_time(field: &'static str, value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| Error::validation(field, format!("'{value}' is not a HH:MM time")))
}

/// Validates the start/end pair and returns them in canonical `HH:MM` form.
fn validate_times(start_time: &str, end_time: &str) -> Result<(String, String)> {
    let start = parse_time("start_time", start_time)?;
    let end = parse_time("end_time", end_time)?;
    if end < start {
        return Err(Error::validation(
            "end_time",
            format!("{end_time} is before start time {start_time}"),
        ));
    }
    Ok((
        start.format("%H:%M").to_string(),
        end.format("%H:%M").to_string(),
    ))
}

/// The admin form sends 0 for "no limit".
fn normalize_max_attendees(max_attendees: Option<i32>) -> Result<Option<i32>> {
    match max_attendees {
        None | Some(0) => Ok(None),
        Some(n) if n < 0 => Err(Error::validation(
            "max_attendees",
            format!("{n} is not a valid capacity"),
        )),
        Some(n) => Ok(Some(n)),
    }
}

fn normalize_image_url(image_url: Option<String>) -> Option<String> {
    image_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}

fn in_date_order(select: Select<Event>) -> Select<Event> {
    select
        .order_by_asc(event::Column::Date)
        .order_by_asc(event::Column::StartTime)
        .order_by_asc(event::Column::CreatedAt)
}

/// Retrieves all events in ascending date order.
pub async fn list_events(db: &DatabaseConnection) -> Result<Vec<event::Model>> {
    in_date_order(Event::find())
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves events dated `today` or later, in ascending date order.
pub async fn list_upcoming_events(
    db: &DatabaseConnection,
    today: NaiveDate,
) -> Result<Vec<event::Model>> {
    in_date_order(Event::find().filter(event::Column::Date.gte(today)))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an event by id, returning None if it does not exist.
pub async fn get_event_by_id(db: &DatabaseConnection, id: &str) -> Result<Option<event::Model>> {
    Event::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Creates an event after validating the form fields.
#[instrument(skip(db, new_event), fields(title = %new_event.title))]
pub async fn add_event(db: &DatabaseConnection, new_event: NewEvent) -> Result<event::Model> {
    let title = required("title", &new_event.title)?;
    let location = required("location", &new_event.location)?;
    let (start_time, end_time) = validate_times(&new_event.start_time, &new_event.end_time)?;
    let max_attendees = normalize_max_attendees(new_event.max_attendees)?;

    let model = event::ActiveModel {
        id: Set(new_id()),
        title: Set(title),
        description: Set(new_event.description.trim().to_string()),
        date: Set(new_event.date),
        start_time: Set(start_time),
        end_time: Set(end_time),
        location: Set(location),
        image_url: Set(normalize_image_url(new_event.image_url)),
        registration_enabled: Set(new_event.registration_enabled),
        max_attendees: Set(max_attendees),
        created_at: Set(Utc::now()),
    };

    let created = model.insert(db).await?;
    info!(event_id = %created.id, date = %created.date, "Event created");
    Ok(created)
}

/// Applies an update onto an existing event and validates the merged record.
fn merge_update(mut current: event::Model, update: EventUpdate) -> Result<event::Model> {
    if let Some(title) = update.title {
        current.title = required("title", &title)?;
    }
    if let Some(description) = update.description {
        current.description = description.trim().to_string();
    }
    if let Some(date) = update.date {
        current.date = date;
    }
    if let Some(start_time) = update.start_time {
        current.start_time = start_time;
    }
    if let Some(end_time) = update.end_time {
        current.end_time = end_time;
    }
    if let Some(location) = update.location {
        current.location = required("location", &location)?;
    }
    if let Some(image_url) = update.image_url {
        current.image_url = normalize_image_url(image_url);
    }
    if let Some(enabled) = update.registration_enabled {
        current.registration_enabled = enabled;
    }
    if let Some(max_attendees) = update.max_attendees {
        current.max_attendees = normalize_max_attendees(max_attendees)?;
    }

    let (start_time, end_time) = validate_times(&current.start_time, &current.end_time)?;
    current.start_time = start_time;
    current.end_time = end_time;
    Ok(current)
}

/// Updates an event, returning None if it does not exist.
///
/// Lowering `max_attendees` below the attendance already registered is rejected with
/// [`Error::CapacityExceeded`]. The check runs under the event's slot lock so it
/// cannot interleave with a registration.
#[instrument(skip(db, slots, update))]
pub async fn update_event(
    db: &DatabaseConnection,
    slots: &SlotLocks,
    id: &str,
    update: EventUpdate,
) -> Result<Option<event::Model>> {
    let _slot = slots.acquire(id).await;
    let txn = db.begin().await?;

    let Some(current) = Event::find_by_id(id).one(&txn).await? else {
        debug!("Event not found for update");
        return Ok(None);
    };
    let previous_cap = current.max_attendees;
    let merged = merge_update(current, update)?;

    if let Some(max_attendees) = merged.max_attendees {
        if Some(max_attendees) != previous_cap {
            let registered = capacity::count_attendees(&txn, id).await?;
            if registered > i64::from(max_attendees) {
                return Err(Error::CapacityExceeded {
                    event_id: id.to_string(),
                    max_attendees,
                    registered,
                });
            }
        }
    }

    let updated = event::ActiveModel::from(merged)
        .reset_all()
        .update(&txn)
        .await?;
    txn.commit().await?;

    info!(event_id = %updated.id, "Event updated");
    Ok(Some(updated))
}

/// Deletes an event by id. Returns true iff a row was removed.
///
/// Registrations for the event are left in place.
#[instrument(skip(db))]
pub async fn delete_event(db: &DatabaseConnection, id: &str) -> Result<bool> {
    let result = Event::delete_by_id(id).exec(db).await?;
    let removed = result.rows_affected > 0;
    info!(removed, "Event delete processed");
    Ok(removed)
}

/// Replaces the whole events collection in one transaction.
#[instrument(skip(db, events), fields(count = events.len()))]
pub async fn replace_all_events(db: &DatabaseConnection, events: Vec<event::Model>) -> Result<()> {
    let txn = db.begin().await?;
    Event::delete_many().exec(&txn).await?;
    for model in events {
        event::ActiveModel::from(model)
            .reset_all()
            .insert(&txn)
            .await?;
    }
    txn.commit().await?;
    info!("Events collection replaced");
    Ok(())
}

/// Inserts the given events only when the events table is empty.
///
/// Returns the number of events inserted.
pub async fn seed_events(db: &DatabaseConnection, seeds: Vec<NewEvent>) -> Result<usize> {
    if Event::find().count(db).await? > 0 {
        debug!("Events already present, skipping seed");
        return Ok(0);
    }
    let mut inserted = 0;
    for seed in seeds {
        add_event(db, seed).await?;
        inserted += 1;
    }
    info!(inserted, "Seeded church events");
    Ok(inserted)
}
