//! Unified error type for the church site backend.
//!
//! Lookups by id never fail with "not found": they return `Ok(None)`. The
//! not-found variants below are only used when a write targets a record that
//! must exist, such as registering for an event.

use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// Storage failure reported by `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Rejected input on a create or update
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        message: String,
    },

    /// The referenced event does not exist
    #[error("Event not found: {id}")]
    EventNotFound {
        /// Requested event id
        id: String,
    },

    /// The referenced registration does not exist
    #[error("Registration not found: {id}")]
    RegistrationNotFound {
        /// Requested registration id
        id: String,
    },

    /// The referenced member does not exist
    #[error("Member not found: {id}")]
    MemberNotFound {
        /// Requested member id
        id: String,
    },

    /// The capacity guard refused a registration
    #[error("Event {event_id} is full: requested {requested}, {remaining} spots remaining")]
    EventFull {
        /// Event the registration targeted
        event_id: String,
        /// Attendees in the rejected submission
        requested: i32,
        /// Spots still available when the submission was rejected
        remaining: i64,
    },

    /// An event update would drop the cap below current attendance
    #[error(
        "Event {event_id} already has {registered} attendees, cannot lower capacity to {max_attendees}"
    )]
    CapacityExceeded {
        /// Event being updated
        event_id: String,
        /// Requested cap
        max_attendees: i32,
        /// Attendees already registered
        registered: i64,
    },

    /// Registration is disabled for the event
    #[error("Registration is closed for event {event_id}")]
    RegistrationClosed {
        /// Event the registration targeted
        event_id: String,
    },

    /// Email/password pair did not match a member
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The password hashing backend failed
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    /// I/O failure (config files, sockets)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required environment variable was missing or not unicode
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] error.
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
