//! Event routes, including the per-event registration form and availability.

use super::AppState;
use crate::core::capacity::{self, Availability};
use crate::core::event::{self, EventUpdate, NewEvent};
use crate::core::registration::{self, NewRegistration};
use crate::entities::{EventModel, RegistrationModel};
use crate::errors::{Error, Result};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Local;

/// All events by date.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<EventModel>>> {
    Ok(Json(event::list_events(&state.database).await?))
}

/// Events dated today or later.
pub async fn upcoming(State(state): State<AppState>) -> Result<Json<Vec<EventModel>>> {
    let today = Local::now().date_naive();
    Ok(Json(event::list_upcoming_events(&state.database, today).await?))
}

/// One event by id.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventModel>> {
    event::get_event_by_id(&state.database, &id)
        .await?
        .map(Json)
        .ok_or(Error::EventNotFound { id })
}

/// Adds an event from the admin form.
pub async fn create(
    State(state): State<AppState>,
    Json(new_event): Json<NewEvent>,
) -> Result<(StatusCode, Json<EventModel>)> {
    let created = event::add_event(&state.database, new_event).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Partial event update; lowering the cap below attendance is refused.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<EventUpdate>,
) -> Result<Json<EventModel>> {
    event::update_event(&state.database, &state.slots, &id, update)
        .await?
        .map(Json)
        .ok_or(Error::EventNotFound { id })
}

/// Removes an event. Its registrations are kept.
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    if event::delete_event(&state.database, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::EventNotFound { id })
    }
}

/// Registrations for one event, oldest first.
pub async fn registrations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<RegistrationModel>>> {
    if event::get_event_by_id(&state.database, &id).await?.is_none() {
        return Err(Error::EventNotFound { id });
    }
    Ok(Json(
        registration::list_registrations_by_event(&state.database, &id).await?,
    ))
}

/// Public registration form. The event id comes from the path.
pub async fn register(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut submission): Json<NewRegistration>,
) -> Result<(StatusCode, Json<RegistrationModel>)> {
    submission.event_id = id;
    let created = registration::add_registration(&state.database, &state.slots, submission).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Registered, remaining and full for one event.
pub async fn availability(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Availability>> {
    capacity::availability(state.database.as_ref(), &id)
        .await?
        .map(Json)
        .ok_or(Error::EventNotFound { id })
}
