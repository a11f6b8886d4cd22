//! HTTP server settings loaded from environment variables.

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Address the HTTP API listens on, from `BIND_ADDRESS`.
///
/// Falls back to `0.0.0.0:3000` when the variable is unset.
#[must_use]
pub fn bind_address() -> String {
    std::env::var("BIND_ADDRESS").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string())
}
