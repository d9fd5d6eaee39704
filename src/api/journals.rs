//! Journal endpoints. Public journals are readable by anyone; everything
//! else is gated on ownership, with admins bypassing ownership uniformly.

use crate::{
    auth::{models::Claims, policy},
    errors::ApiError,
    server::AppState,
    store::journals::{Journal, JournalInput},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

/// GET /api/journals/public (public)
pub async fn list_public(State(state): State<AppState>) -> Result<Json<Vec<Journal>>, ApiError> {
    Ok(Json(state.journals.list_public()?))
}

/// GET /api/journals (admin)
pub async fn list_all(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Journal>>, ApiError> {
    policy::require_admin(&claims)?;
    Ok(Json(state.journals.list()?))
}

/// GET /api/journals/{id}
///
/// Readable by the owner, an admin, or anyone if the journal is public.
pub async fn get(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(journal_id): Path<i64>,
) -> Result<Json<Journal>, ApiError> {
    let journal = state
        .journals
        .find_by_id(journal_id)?
        .ok_or(ApiError::NotFound("Journal"))?;

    if !journal.is_public {
        policy::require_owner_or_admin(&claims, journal.account_id)?;
    }

    Ok(Json(journal))
}

/// GET /api/journals/my-journals
pub async fn my_journals(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Journal>>, ApiError> {
    let account_id = policy::account_id(&claims)?;
    Ok(Json(state.journals.list_for_account(account_id)?))
}

/// POST /api/journals
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<JournalInput>,
) -> Result<(StatusCode, Json<Journal>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }

    let account_id = policy::account_id(&claims)?;
    let journal = state.journals.create(account_id, &payload)?;
    Ok((StatusCode::CREATED, Json(journal)))
}

/// PUT /api/journals/{id} (owner or admin)
pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(journal_id): Path<i64>,
    Json(payload): Json<JournalInput>,
) -> Result<Json<Journal>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }

    let journal = state
        .journals
        .find_by_id(journal_id)?
        .ok_or(ApiError::NotFound("Journal"))?;
    policy::require_owner_or_admin(&claims, journal.account_id)?;

    Ok(Json(state.journals.update(journal_id, &payload)?))
}

/// DELETE /api/journals/{id} (owner or admin)
pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(journal_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let journal = state
        .journals
        .find_by_id(journal_id)?
        .ok_or(ApiError::NotFound("Journal"))?;
    policy::require_owner_or_admin(&claims, journal.account_id)?;

    state.journals.delete(journal_id)?;
    Ok(StatusCode::NO_CONTENT)
}
