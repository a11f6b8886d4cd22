//! Member routes.
//!
//! Password hashes never leave the server: the member model skips them when
//! serialized, so every response here is safe to return as-is.

use super::AppState;
use crate::core::member::{self, MemberUpdate, MembershipApplication};
use crate::entities::MemberModel;
use crate::errors::{Error, Result};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

/// Login form body
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// Login email, matched case-insensitively
    pub email: String,
    /// Plaintext password, verified against the stored hash
    pub password: String,
}

/// Query string for the roster listing
#[derive(Debug, Deserialize)]
pub struct RosterQuery {
    /// Case-insensitive filter on name, email or phone
    pub search: Option<String>,
}

/// The roster, by last then first name, optionally filtered by `?search=`.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<RosterQuery>,
) -> Result<Json<Vec<MemberModel>>> {
    let members = match query.search.as_deref() {
        Some(term) => member::search_members(&state.database, term).await?,
        None => member::list_members(&state.database).await?,
    };
    Ok(Json(members))
}

/// One member by id.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MemberModel>> {
    member::get_member_by_id(&state.database, &id)
        .await?
        .map(Json)
        .ok_or(Error::MemberNotFound { id })
}

/// Submits a membership application.
pub async fn apply(
    State(state): State<AppState>,
    Json(application): Json<MembershipApplication>,
) -> Result<(StatusCode, Json<MemberModel>)> {
    let created = member::apply_for_membership(&state.database, application).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Partial member update.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<MemberUpdate>,
) -> Result<Json<MemberModel>> {
    member::update_member(&state.database, &id, update)
        .await?
        .map(Json)
        .ok_or(Error::MemberNotFound { id })
}

/// Removes a member.
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    if member::delete_member(&state.database, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::MemberNotFound { id })
    }
}

/// Member login. Unknown emails and wrong passwords look the same to the caller.
pub async fn authenticate(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<MemberModel>> {
    member::authenticate_member(&state.database, &credentials.email, &credentials.password)
        .await?
        .map(Json)
        .ok_or(Error::InvalidCredentials)
}
