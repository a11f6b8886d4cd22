//! Maps [`Error`] onto HTTP responses.
//!
//! Business-rule errors pass their message through to the client. Storage and
//! infrastructure errors are logged and reported as a bare 500.

use crate::errors::Error;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

impl Error {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::EventNotFound { .. }
            | Self::RegistrationNotFound { .. }
            | Self::MemberNotFound { .. } => StatusCode::NOT_FOUND,
            Self::EventFull { .. } | Self::CapacityExceeded { .. } => StatusCode::CONFLICT,
            Self::RegistrationClosed { .. } => StatusCode::FORBIDDEN,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Database(_)
            | Self::Config { .. }
            | Self::PasswordHash(_)
            | Self::Io(_)
            | Self::EnvVar(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "Internal error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
