//! Registration business logic - Event sign-ups.
//!
//! Submissions go through the capacity guard: the event's slot lock is held while
//! attendance is counted and the new row is inserted in one transaction. Edits that
//! change the seat count or move a registration to another event are checked the
//! same way against the target event.

use crate::{
    core::{
        capacity::{self, SlotLocks},
        new_id, required,
        update::double_option,
        validate_email,
    },
    entities::{Event, Registration, registration},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

fn default_attendees() -> i32 {
    1
}

/// Fields submitted by the public event registration form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRegistration {
    /// Event being registered for; filled from the URL on `/api/events/{id}/registrations`
    #[serde(default)]
    pub event_id: String,
    /// Registrant given name
    pub first_name: String,
    /// Registrant family name
    pub last_name: String,
    /// Registrant email
    pub email: String,
    /// Registrant phone
    pub phone: String,
    /// Seats requested, defaults to 1
    #[serde(default = "default_attendees")]
    pub number_of_attendees: i32,
    /// Optional notes for the organizers
    #[serde(default)]
    pub special_requests: Option<String>,
}

/// Field-level changes to a registration. Unset fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationUpdate {
    /// Move the registration to another event
    pub event_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// New seat count, re-checked against capacity
    pub number_of_attendees: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub special_requests: Option<Option<String>>,
}

fn validate_attendees(number_of_attendees: i32) -> Result<i32> {
    if number_of_attendees < 1 {
        return Err(Error::validation(
            "number_of_attendees",
            format!("{number_of_attendees} is less than 1"),
        ));
    }
    Ok(number_of_attendees)
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Retrieves all registrations, oldest first.
pub async fn list_registrations(db: &DatabaseConnection) -> Result<Vec<registration::Model>> {
    Registration::find()
        .order_by_asc(registration::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the registrations for one event, oldest first.
pub async fn list_registrations_by_event(
    db: &DatabaseConnection,
    event_id: &str,
) -> Result<Vec<registration::Model>> {
    Registration::find()
        .filter(registration::Column::EventId.eq(event_id))
        .order_by_asc(registration::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a registration by id, returning None if not found.
pub async fn get_registration_by_id(
    db: &DatabaseConnection,
    id: &str,
) -> Result<Option<registration::Model>> {
    Registration::find_by_id(id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Submits a registration, reserving seats atomically.
///
/// # Errors
/// - [`Error::Validation`] for missing names, a malformed email or fewer than one attendee
/// - [`Error::EventNotFound`] when the event does not exist
/// - [`Error::RegistrationClosed`] when the event does not accept registrations
/// - [`Error::EventFull`] when the seats requested exceed what is left
#[instrument(skip(db, slots, submission), fields(event_id = %submission.event_id))]
pub async fn add_registration(
    db: &DatabaseConnection,
    slots: &SlotLocks,
    submission: NewRegistration,
) -> Result<registration::Model> {
    let first_name = required("first_name", &submission.first_name)?;
    let last_name = required("last_name", &submission.last_name)?;
    let email = validate_email(&submission.email)?;
    let number_of_attendees = validate_attendees(submission.number_of_attendees)?;
    let event_id = required("event_id", &submission.event_id)?;

    let _slot = slots.acquire(&event_id).await;
    let txn = db.begin().await?;

    let event = Event::find_by_id(event_id.as_str())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::EventNotFound {
            id: event_id.clone(),
        })?;
    if !event.registration_enabled {
        warn!("Registration attempted for closed event");
        return Err(Error::RegistrationClosed { event_id });
    }

    let registered = capacity::count_attendees(&txn, &event_id).await?;
    if let Err(e) = capacity::ensure_room(&event, registered, number_of_attendees) {
        warn!(registered, requested = number_of_attendees, "Registration rejected: event full");
        return Err(e);
    }

    let created = registration::ActiveModel {
        id: Set(new_id()),
        event_id: Set(event_id),
        first_name: Set(first_name),
        last_name: Set(last_name),
        email: Set(email),
        phone: Set(submission.phone.trim().to_string()),
        number_of_attendees: Set(number_of_attendees),
        special_requests: Set(optional_text(submission.special_requests)),
        created_at: Set(Utc::now()),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(
        registration_id = %created.id,
        attendees = created.number_of_attendees,
        "Registration accepted"
    );
    Ok(created)
}

fn merge_update(
    mut current: registration::Model,
    update: RegistrationUpdate,
) -> Result<registration::Model> {
    if let Some(event_id) = update.event_id {
        current.event_id = required("event_id", &event_id)?;
    }
    if let Some(first_name) = update.first_name {
        current.first_name = required("first_name", &first_name)?;
    }
    if let Some(last_name) = update.last_name {
        current.last_name = required("last_name", &last_name)?;
    }
    if let Some(email) = update.email {
        current.email = validate_email(&email)?;
    }
    if let Some(phone) = update.phone {
        current.phone = phone.trim().to_string();
    }
    if let Some(number_of_attendees) = update.number_of_attendees {
        current.number_of_attendees = validate_attendees(number_of_attendees)?;
    }
    if let Some(special_requests) = update.special_requests {
        current.special_requests = optional_text(special_requests);
    }
    Ok(current)
}

/// Updates a registration, returning None if it does not exist.
///
/// When the seat count grows or the registration moves to another event, the
/// target event's capacity is re-checked with this registration's own seats left
/// out of the count. Closed registration on the target event does not block edits.
#[instrument(skip(db, slots, update))]
pub async fn update_registration(
    db: &DatabaseConnection,
    slots: &SlotLocks,
    id: &str,
    update: RegistrationUpdate,
) -> Result<Option<registration::Model>> {
    let Some(current) = get_registration_by_id(db, id).await? else {
        debug!("Registration not found for update");
        return Ok(None);
    };
    // Lock key must match the id merge_update stores
    let target_event = match update.event_id.as_deref() {
        Some(event_id) => required("event_id", event_id)?,
        None => current.event_id,
    };

    let _slot = slots.acquire(&target_event).await;
    let txn = db.begin().await?;

    // Re-read under the lock so the merge starts from committed state
    let Some(current) = Registration::find_by_id(id).one(&txn).await? else {
        return Ok(None);
    };
    let previous_event = current.event_id.clone();
    let previous_attendees = current.number_of_attendees;
    let merged = merge_update(current, update)?;

    let moved = merged.event_id != previous_event;
    if moved || merged.number_of_attendees > previous_attendees {
        let event = Event::find_by_id(merged.event_id.as_str())
            .one(&txn)
            .await?
            .ok_or_else(|| Error::EventNotFound {
                id: merged.event_id.clone(),
            })?;
        let registered =
            capacity::count_attendees_excluding(&txn, &merged.event_id, Some(id)).await?;
        capacity::ensure_room(&event, registered, merged.number_of_attendees)?;
    }

    let updated = registration::ActiveModel::from(merged)
        .reset_all()
        .update(&txn)
        .await?;
    txn.commit().await?;

    info!(registration_id = %updated.id, moved, "Registration updated");
    Ok(Some(updated))
}

/// Deletes a registration by id. Returns true iff a row was removed.
#[instrument(skip(db))]
pub async fn delete_registration(db: &DatabaseConnection, id: &str) -> Result<bool> {
    let result = Registration::delete_by_id(id).exec(db).await?;
    let removed = result.rows_affected > 0;
    info!(removed, "Registration delete processed");
    Ok(removed)
}

/// Replaces every registration in one transaction.
///
/// Records are stored as given; capacity is not re-checked.
#[instrument(skip(db, registrations), fields(count = registrations.len()))]
pub async fn replace_all_registrations(
    db: &DatabaseConnection,
    registrations: Vec<registration::Model>,
) -> Result<()> {
    let txn = db.begin().await?;
    Registration::delete_many().exec(&txn).await?;
    for model in registrations {
        registration::ActiveModel::from(model)
            .reset_all()
            .insert(&txn)
            .await?;
    }
    txn.commit().await?;
    info!("Registrations replaced");
    Ok(())
}

/// Total seats taken for an event.
pub async fn count_attendees_by_event(db: &DatabaseConnection, event_id: &str) -> Result<i64> {
    capacity::count_attendees(db, event_id).await
}

/// Whether an event has reached its cap. Unlimited and unknown events are never full.
pub async fn is_event_full(db: &DatabaseConnection, event_id: &str) -> Result<bool> {
    capacity::is_event_full(db, event_id).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::event::{EventUpdate, update_event};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_registration_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let slots = SlotLocks::new();

        let mut zero = new_registration("event", 1);
        zero.number_of_attendees = 0;
        assert!(matches!(
            add_registration(&db, &slots, zero).await,
            Err(Error::Validation {
                field: "number_of_attendees",
                ..
            })
        ));

        let mut no_name = new_registration("event", 1);
        no_name.last_name = String::new();
        assert!(matches!(
            add_registration(&db, &slots, no_name).await,
            Err(Error::Validation {
                field: "last_name",
                ..
            })
        ));

        let mut bad_email = new_registration("event", 1);
        bad_email.email = "michael".to_string();
        assert!(matches!(
            add_registration(&db, &slots, bad_email).await,
            Err(Error::Validation { field: "email", .. })
        ));
        Ok(())
    }

    #[test]
    fn test_attendees_default_to_one() {
        let submission: NewRegistration = serde_json::from_str(
            r#"{"eventId": "1", "firstName": "Michael", "lastName": "Johnson",
                "email": "michael@example.com", "phone": "(555) 234-5678"}"#,
        )
        .unwrap();
        assert_eq!(submission.number_of_attendees, 1);
        assert_eq!(submission.special_requests, None);
    }

    #[tokio::test]
    async fn test_last_slots_then_rejection() -> Result<()> {
        let db = setup_test_db().await?;
        let slots = SlotLocks::new();
        let event = create_test_event(&db, "Retreat", date(2025, 9, 1), Some(2)).await?;

        add_registration(&db, &slots, new_registration(&event.id, 2)).await?;
        assert!(is_event_full(&db, &event.id).await?);

        let result = add_registration(&db, &slots, new_registration(&event.id, 1)).await;
        assert!(matches!(
            result,
            Err(Error::EventFull {
                requested: 1,
                remaining: 0,
                ..
            })
        ));
        assert_eq!(count_attendees_by_event(&db, &event.id).await?, 2);
        assert_eq!(list_registrations_by_event(&db, &event.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_small_first_then_large_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let slots = SlotLocks::new();
        let event = create_test_event(&db, "Retreat", date(2025, 9, 1), Some(2)).await?;

        add_registration(&db, &slots, new_registration(&event.id, 1)).await?;
        let result = add_registration(&db, &slots, new_registration(&event.id, 2)).await;
        assert!(matches!(result, Err(Error::EventFull { remaining: 1, .. })));
        assert_eq!(count_attendees_by_event(&db, &event.id).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_submissions_cannot_overbook() -> Result<()> {
        let db = setup_test_db().await?;
        let slots = SlotLocks::new();
        let event = create_test_event(&db, "Retreat", date(2025, 9, 1), Some(2)).await?;

        let (first, second) = tokio::join!(
            add_registration(&db, &slots, new_registration(&event.id, 2)),
            add_registration(&db, &slots, new_registration(&event.id, 1)),
        );

        let accepted = [first.is_ok(), second.is_ok()]
            .iter()
            .filter(|ok| **ok)
            .count();
        assert_eq!(accepted, 1);
        assert!(count_attendees_by_event(&db, &event.id).await? <= 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_registration_requires_open_existing_event() -> Result<()> {
        let db = setup_test_db().await?;
        let slots = SlotLocks::new();

        let result = add_registration(&db, &slots, new_registration("missing", 1)).await;
        assert!(matches!(result, Err(Error::EventNotFound { .. })));

        let mut form = new_event("Members Meeting", date(2025, 10, 1));
        form.registration_enabled = false;
        let closed = crate::core::event::add_event(&db, form).await?;
        let result = add_registration(&db, &slots, new_registration(&closed.id, 1)).await;
        assert!(matches!(result, Err(Error::RegistrationClosed { .. })));
        assert!(list_registrations(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_unlimited_event_accepts_any_size() -> Result<()> {
        let db = setup_test_db().await?;
        let slots = SlotLocks::new();
        let event = create_test_event(&db, "Easter Service", date(2026, 4, 5), None).await?;

        add_registration(&db, &slots, new_registration(&event.id, 400)).await?;
        add_registration(&db, &slots, new_registration(&event.id, 400)).await?;
        assert_eq!(count_attendees_by_event(&db, &event.id).await?, 800);
        assert!(!is_event_full(&db, &event.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_registration_rechecks_capacity() -> Result<()> {
        let db = setup_test_db().await?;
        let slots = SlotLocks::new();
        let event = create_test_event(&db, "Picnic", date(2025, 7, 15), Some(5)).await?;
        let mine = add_registration(&db, &slots, new_registration(&event.id, 2)).await?;
        add_registration(&db, &slots, new_registration(&event.id, 2)).await?;

        // Own seats are excluded: 2 others + 3 = 5 fits
        let grow = RegistrationUpdate {
            number_of_attendees: Some(3),
            ..Default::default()
        };
        let updated = update_registration(&db, &slots, &mine.id, grow)
            .await?
            .unwrap();
        assert_eq!(updated.number_of_attendees, 3);

        let too_many = RegistrationUpdate {
            number_of_attendees: Some(4),
            ..Default::default()
        };
        let result = update_registration(&db, &slots, &mine.id, too_many).await;
        assert!(matches!(result, Err(Error::EventFull { .. })));
        assert_eq!(count_attendees_by_event(&db, &event.id).await?, 5);

        let shrink = RegistrationUpdate {
            number_of_attendees: Some(1),
            special_requests: Some(Some("Vegetarian meal options".to_string())),
            ..Default::default()
        };
        let updated = update_registration(&db, &slots, &mine.id, shrink)
            .await?
            .unwrap();
        assert_eq!(updated.number_of_attendees, 1);
        assert_eq!(
            updated.special_requests.as_deref(),
            Some("Vegetarian meal options")
        );

        assert!(
            update_registration(&db, &slots, "missing", RegistrationUpdate::default())
                .await?
                .is_none()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_move_registration_between_events() -> Result<()> {
        let db = setup_test_db().await?;
        let slots = SlotLocks::new();
        let picnic = create_test_event(&db, "Picnic", date(2025, 7, 15), Some(10)).await?;
        let vbs = create_test_event(&db, "VBS", date(2025, 8, 7), Some(3)).await?;
        let mine = add_registration(&db, &slots, new_registration(&picnic.id, 3)).await?;
        add_registration(&db, &slots, new_registration(&vbs.id, 1)).await?;

        let move_to_vbs = RegistrationUpdate {
            event_id: Some(vbs.id.clone()),
            ..Default::default()
        };
        let result = update_registration(&db, &slots, &mine.id, move_to_vbs.clone()).await;
        assert!(matches!(result, Err(Error::EventFull { .. })));

        let make_room = RegistrationUpdate {
            number_of_attendees: Some(2),
            ..move_to_vbs
        };
        let moved = update_registration(&db, &slots, &mine.id, make_room)
            .await?
            .unwrap();
        assert_eq!(moved.event_id, vbs.id);
        assert_eq!(count_attendees_by_event(&db, &picnic.id).await?, 0);
        assert!(is_event_full(&db, &vbs.id).await?);

        let to_nowhere = RegistrationUpdate {
            event_id: Some("missing".to_string()),
            ..Default::default()
        };
        let result = update_registration(&db, &slots, &mine.id, to_nowhere).await;
        assert!(matches!(result, Err(Error::EventNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_padded_event_id_takes_the_event_lock() -> Result<()> {
        let db = setup_test_db().await?;
        let slots = SlotLocks::new();
        let picnic = create_test_event(&db, "Picnic", date(2025, 7, 15), Some(10)).await?;
        let vbs = create_test_event(&db, "VBS", date(2025, 8, 7), Some(3)).await?;
        let mine = add_registration(&db, &slots, new_registration(&picnic.id, 1)).await?;
        let move_to_vbs = RegistrationUpdate {
            event_id: Some(format!(" {} ", vbs.id)),
            ..Default::default()
        };

        let guard = slots.acquire(&vbs.id).await;
        let blocked = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            update_registration(&db, &slots, &mine.id, move_to_vbs.clone()),
        )
        .await;
        assert!(blocked.is_err());
        assert_eq!(count_attendees_by_event(&db, &vbs.id).await?, 0);
        drop(guard);

        let moved = update_registration(&db, &slots, &mine.id, move_to_vbs)
            .await?
            .unwrap();
        assert_eq!(moved.event_id, vbs.id);
        assert_eq!(count_attendees_by_event(&db, &vbs.id).await?, 1);

        // Submissions are keyed the same way
        let guard = slots.acquire(&vbs.id).await;
        let blocked = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            add_registration(&db, &slots, new_registration(&format!("  {}", vbs.id), 1)),
        )
        .await;
        assert!(blocked.is_err());
        drop(guard);

        let created =
            add_registration(&db, &slots, new_registration(&format!("  {}", vbs.id), 1)).await?;
        assert_eq!(created.event_id, vbs.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_lowering_cap_is_blocked_by_registrations() -> Result<()> {
        let db = setup_test_db().await?;
        let slots = SlotLocks::new();
        let event = create_test_event(&db, "Picnic", date(2025, 7, 15), Some(5)).await?;
        add_registration(&db, &slots, new_registration(&event.id, 4)).await?;

        let update = EventUpdate {
            max_attendees: Some(Some(3)),
            ..Default::default()
        };
        assert!(update_event(&db, &slots, &event.id, update).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_and_replace_registrations() -> Result<()> {
        let db = setup_test_db().await?;
        let slots = SlotLocks::new();
        let event = create_test_event(&db, "Picnic", date(2025, 7, 15), None).await?;
        let first = add_registration(&db, &slots, new_registration(&event.id, 1)).await?;
        add_registration(&db, &slots, new_registration(&event.id, 2)).await?;

        assert!(!delete_registration(&db, "missing").await?);
        assert_eq!(list_registrations(&db).await?.len(), 2);
        assert!(delete_registration(&db, &first.id).await?);
        assert_eq!(list_registrations(&db).await?.len(), 1);
        assert!(get_registration_by_id(&db, &first.id).await?.is_none());

        replace_all_registrations(&db, vec![first.clone()]).await?;
        assert_eq!(list_registrations(&db).await?, vec![first]);
        assert_eq!(count_attendees_by_event(&db, &event.id).await?, 1);
        Ok(())
    }
}
