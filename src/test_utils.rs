//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use crate::{
    api::{self, AppState},
    core::{
        capacity::SlotLocks,
        event::{self, NewEvent},
        member::{self, MembershipApplication},
        registration::{self, NewRegistration},
    },
    entities::{self, MembershipType},
    errors::Result,
};
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::{NaiveDate, Utc};
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use tower::ServiceExt;
use tracing_subscriber::EnvFilter;

/// Password used for every member created by these helpers
pub const TEST_PASSWORD: &str = "password123";

/// Installs a test-friendly tracing subscriber (no-op if one is already set).
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A router over a fresh test database, plus the state it shares.
pub async fn test_app() -> Result<(Router, AppState)> {
    let db = setup_test_db().await?;
    let state = AppState::new(db, "Test Church");
    Ok((api::create_router(state.clone()), state))
}

/// Sends one request through the router and decodes the JSON reply.
///
/// Empty bodies (e.g. `204 No Content`) decode as `Value::Null`.
pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Shorthand for a calendar date.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// An event form with sensible defaults.
///
/// # Defaults
/// * times: 11:00 - 15:00
/// * `location`: "Community Park"
/// * `registration_enabled`: true
/// * `max_attendees`: None
pub fn new_event(title: &str, on: NaiveDate) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        description: format!("{title} for the whole church family"),
        date: on,
        start_time: "11:00".to_string(),
        end_time: "15:00".to_string(),
        location: "Community Park".to_string(),
        image_url: None,
        registration_enabled: true,
        max_attendees: None,
    }
}

/// Creates an event open for registration with an optional cap.
pub async fn create_test_event(
    db: &DatabaseConnection,
    title: &str,
    on: NaiveDate,
    max_attendees: Option<i32>,
) -> Result<entities::event::Model> {
    let mut form = new_event(title, on);
    form.max_attendees = max_attendees;
    event::add_event(db, form).await
}

/// An unsaved event model for pure-function tests.
pub fn sample_event_model(max_attendees: Option<i32>) -> entities::event::Model {
    entities::event::Model {
        id: "event-1".to_string(),
        title: "Annual Community Picnic".to_string(),
        description: String::new(),
        date: date(2025, 7, 15),
        start_time: "11:00".to_string(),
        end_time: "15:00".to_string(),
        location: "Community Park".to_string(),
        image_url: None,
        registration_enabled: true,
        max_attendees,
        created_at: Utc::now(),
    }
}

/// A registration form for `event_id` with `attendees` seats.
pub fn new_registration(event_id: &str, attendees: i32) -> NewRegistration {
    NewRegistration {
        event_id: event_id.to_string(),
        first_name: "Michael".to_string(),
        last_name: "Johnson".to_string(),
        email: "michael.johnson@example.com".to_string(),
        phone: "(555) 234-5678".to_string(),
        number_of_attendees: attendees,
        special_requests: None,
    }
}

/// Submits a registration through the capacity guard.
pub async fn create_test_registration(
    db: &DatabaseConnection,
    slots: &SlotLocks,
    event_id: &str,
    attendees: i32,
) -> Result<entities::registration::Model> {
    registration::add_registration(db, slots, new_registration(event_id, attendees)).await
}

/// An individual membership application using [`TEST_PASSWORD`].
pub fn membership_application(email: &str, birth_date: NaiveDate) -> MembershipApplication {
    MembershipApplication {
        membership_type: MembershipType::Individual,
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        email: email.to_string(),
        phone: "(555) 123-4567".to_string(),
        address: "123 Main St".to_string(),
        city: "Anytown".to_string(),
        state: "CA".to_string(),
        zip_code: "12345".to_string(),
        birth_date,
        password: TEST_PASSWORD.to_string(),
        spouse_name: None,
        anniversary_date: None,
        children: None,
        ministry_interests: Some("Worship, Outreach".to_string()),
        notes: None,
    }
}

/// Creates a member through the application flow.
pub async fn create_test_member(
    db: &DatabaseConnection,
    email: &str,
    birth_date: NaiveDate,
) -> Result<entities::member::Model> {
    member::apply_for_membership(db, membership_application(email, birth_date)).await
}

/// An unsaved member model for calendar tests. `marriage` is `(spouse, wedding date)`.
pub fn member_model(
    first_name: &str,
    last_name: &str,
    birth_date: NaiveDate,
    marriage: Option<(&str, NaiveDate)>,
) -> entities::member::Model {
    entities::member::Model {
        id: format!("{}-{}", first_name.to_lowercase(), last_name.to_lowercase()),
        membership_type: if marriage.is_some() {
            MembershipType::Family
        } else {
            MembershipType::Individual
        },
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!(
            "{}.{}@example.com",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        ),
        phone: "(555) 987-6543".to_string(),
        address: "456 Oak Ave".to_string(),
        city: "Somewhere".to_string(),
        state: "NY".to_string(),
        zip_code: "67890".to_string(),
        birth_date,
        password_hash: String::new(),
        spouse_name: marriage.map(|(spouse, _)| spouse.to_string()),
        anniversary_date: marriage.map(|(_, wedding)| wedding),
        children: None,
        ministry_interests: None,
        notes: None,
        created_at: Utc::now(),
    }
}
