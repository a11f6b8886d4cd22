//! HTTP API - JSON routes over the core operations.
//!
//! Bodies use camelCase field names. Handlers stay thin: they extract, call into
//! `core`, and let [`crate::errors::Error`] pick the status code.

/// Birthday, anniversary and event calendar
pub mod calendar;
/// Error to response mapping
pub mod error;
/// Event administration and per-event registration views
pub mod events;
/// Liveness endpoint
pub mod health;
/// Member roster, applications and authentication
pub mod members;
/// Registration administration
pub mod registrations;

use crate::core::capacity::SlotLocks;
use axum::Router;
use axum::routing::{get, post};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared data available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection for all storage operations
    pub database: Arc<DatabaseConnection>,
    /// Per-event reservation locks for the capacity guard
    pub slots: SlotLocks,
    /// Display name reported by the health endpoint
    pub church_name: Arc<str>,
}

impl AppState {
    /// Creates the handler state around a database connection.
    #[must_use]
    pub fn new(database: DatabaseConnection, church_name: impl Into<Arc<str>>) -> Self {
        Self {
            database: Arc::new(database),
            slots: SlotLocks::new(),
            church_name: church_name.into(),
        }
    }
}

/// Builds the full router.
pub fn create_router(state: AppState) -> Router {
    let members = Router::new()
        .route("/api/members", get(members::list).post(members::apply))
        .route("/api/members/authenticate", post(members::authenticate))
        .route(
            "/api/members/{id}",
            get(members::get).patch(members::update).delete(members::delete),
        );

    let events = Router::new()
        .route("/api/events", get(events::list).post(events::create))
        .route("/api/events/upcoming", get(events::upcoming))
        .route(
            "/api/events/{id}",
            get(events::get).patch(events::update).delete(events::delete),
        )
        .route(
            "/api/events/{id}/registrations",
            get(events::registrations).post(events::register),
        )
        .route("/api/events/{id}/availability", get(events::availability));

    let registrations = Router::new()
        .route(
            "/api/registrations",
            get(registrations::list).post(registrations::create),
        )
        .route(
            "/api/registrations/{id}",
            get(registrations::get)
                .patch(registrations::update)
                .delete(registrations::delete),
        );

    let calendar = Router::new()
        .route("/api/calendar", get(calendar::calendar))
        .route("/api/calendar/upcoming", get(calendar::upcoming));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(members)
        .merge(events)
        .merge(registrations)
        .merge(calendar)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
