//! Registration capacity guard.
//!
//! Attendance is the sum of `number_of_attendees` over an event's registrations,
//! not the number of registration rows. Writes that can change attendance take the
//! event's slot lock from [`SlotLocks`] and do their count, compare and write inside
//! one database transaction, so two submissions racing for the last spot cannot
//! both commit.

use crate::{
    entities::{Event, Registration, event, registration},
    errors::{Error, Result},
};
use sea_orm::{QuerySelect, prelude::*};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Per-event reservation locks shared by every request handler.
#[derive(Debug, Default, Clone)]
pub struct SlotLocks {
    inner: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl SlotLocks {
    /// Creates an empty lock registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to the event's attendance.
    ///
    /// The guard must be held until the write that depends on the count has committed.
    pub async fn acquire(&self, event_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(event_id.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}

/// Snapshot of an event's attendance for the registration page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    /// Attendees already registered
    pub registered: i64,
    /// The event's cap, if any
    pub max_attendees: Option<i32>,
    /// Spots left, `None` when the event is unlimited
    pub remaining: Option<i64>,
    /// Whether new registrations will be refused
    pub full: bool,
}

/// Sums `number_of_attendees` across all registrations for an event.
pub async fn count_attendees<C>(db: &C, event_id: &str) -> Result<i64>
where
    C: ConnectionTrait,
{
    count_attendees_excluding(db, event_id, None).await
}

/// Like [`count_attendees`], leaving out one registration (the one being edited).
pub(crate) async fn count_attendees_excluding<C>(
    db: &C,
    event_id: &str,
    excluded_registration: Option<&str>,
) -> Result<i64>
where
    C: ConnectionTrait,
{
    let mut query = Registration::find().filter(registration::Column::EventId.eq(event_id));
    if let Some(id) = excluded_registration {
        query = query.filter(registration::Column::Id.ne(id));
    }

    let total: Option<Option<i64>> = query
        .select_only()
        .column_as(registration::Column::NumberOfAttendees.sum(), "total")
        .into_tuple()
        .one(db)
        .await?;

    Ok(total.flatten().unwrap_or(0))
}

/// Spots left given the current count, `None` for unlimited events.
#[must_use]
pub fn remaining_spots(event: &event::Model, registered: i64) -> Option<i64> {
    event
        .max_attendees
        .map(|max| (i64::from(max) - registered).max(0))
}

/// Whether an event with `registered` attendees accepts no more registrations.
#[must_use]
pub fn is_full_at(event: &event::Model, registered: i64) -> bool {
    event
        .max_attendees
        .is_some_and(|max| registered >= i64::from(max))
}

/// Rejects a submission of `requested` attendees that would overbook the event.
pub fn ensure_room(event: &event::Model, registered: i64, requested: i32) -> Result<()> {
    match remaining_spots(event, registered) {
        Some(remaining) if i64::from(requested) > remaining => Err(Error::EventFull {
            event_id: event.id.clone(),
            requested,
            remaining,
        }),
        _ => Ok(()),
    }
}

/// Returns true when the event has a cap and its attendance has reached it.
///
/// Unknown events and events without `max_attendees` are never full.
pub async fn is_event_full<C>(db: &C, event_id: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    let Some(event) = Event::find_by_id(event_id).one(db).await? else {
        return Ok(false);
    };
    if event.max_attendees.is_none() {
        return Ok(false);
    }
    let registered = count_attendees(db, event_id).await?;
    Ok(is_full_at(&event, registered))
}

/// Attendance summary for an event, `None` when the event does not exist.
pub async fn availability<C>(db: &C, event_id: &str) -> Result<Option<Availability>>
where
    C: ConnectionTrait,
{
    let Some(event) = Event::find_by_id(event_id).one(db).await? else {
        return Ok(None);
    };
    let registered = count_attendees(db, event_id).await?;
    Ok(Some(Availability {
        registered,
        max_attendees: event.max_attendees,
        remaining: remaining_spots(&event, registered),
        full: is_full_at(&event, registered),
    }))
}
