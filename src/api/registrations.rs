//! Registration administration routes.

use super::AppState;
use crate::core::registration::{self, NewRegistration, RegistrationUpdate};
use crate::entities::RegistrationModel;
use crate::errors::{Error, Result};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

/// Every registration, oldest first.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<RegistrationModel>>> {
    Ok(Json(registration::list_registrations(&state.database).await?))
}

/// One registration by id.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RegistrationModel>> {
    registration::get_registration_by_id(&state.database, &id)
        .await?
        .map(Json)
        .ok_or(Error::RegistrationNotFound { id })
}

/// Same as the per-event form, with `eventId` in the body.
pub async fn create(
    State(state): State<AppState>,
    Json(submission): Json<NewRegistration>,
) -> Result<(StatusCode, Json<RegistrationModel>)> {
    let created = registration::add_registration(&state.database, &state.slots, submission).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Partial registration update, re-checked against capacity.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<RegistrationUpdate>,
) -> Result<Json<RegistrationModel>> {
    registration::update_registration(&state.database, &state.slots, &id, update)
        .await?
        .map(Json)
        .ok_or(Error::RegistrationNotFound { id })
}

/// Removes a registration.
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    if registration::delete_registration(&state.database, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::RegistrationNotFound { id })
    }
}
