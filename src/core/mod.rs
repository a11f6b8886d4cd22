//! Core business logic - framework-agnostic member, event, registration and calendar operations.
//!
//! Every function takes the `SeaORM` connection it should use, so callers can pass a
//! pooled connection, a transaction, or an in-memory test database.

/// Birthday, anniversary and church-event occurrences for the calendar and dashboard
pub mod calendar;
/// Attendee counting and atomic slot reservation
pub mod capacity;
/// Event CRUD with date ordering and validation
pub mod event;
/// Member roster, membership applications and authentication
pub mod member;
/// Argon2 password hashing
pub mod password;
/// Registration CRUD guarded by the capacity check
pub mod registration;

pub(crate) mod update;

use uuid::Uuid;

/// Generates the id for a new record.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Trims a required text field, rejecting it when nothing is left.
pub(crate) fn required(field: &'static str, value: &str) -> crate::errors::Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(crate::errors::Error::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Basic shape check for an email address.
pub(crate) fn validate_email(value: &str) -> crate::errors::Result<String> {
    let email = required("email", value)?;
    if !email.contains('@') {
        return Err(crate::errors::Error::validation(
            "email",
            format!("'{email}' is not an email address"),
        ));
    }
    Ok(email)
}
