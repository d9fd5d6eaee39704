//! Event endpoints. Listing and lookup are public; mutation is admin-only;
//! registration acts on the caller's own account.

use crate::{
    auth::{models::Claims, policy},
    errors::ApiError,
    server::AppState,
    store::events::{Event, EventInput},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};

fn validate(input: &EventInput) -> Result<(), ApiError> {
    if input.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    if input.end_date < input.start_date {
        return Err(ApiError::Validation(
            "End date must not be before start date".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/events (public)
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(state.events.list()?))
}

/// GET /api/events/{id} (public)
pub async fn get(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Json<Event>, ApiError> {
    let event = state
        .events
        .find_by_id(event_id)?
        .ok_or(ApiError::NotFound("Event"))?;
    Ok(Json(event))
}

/// POST /api/events (admin)
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<EventInput>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    policy::require_admin(&claims)?;
    validate(&payload)?;

    let event = state.events.create(&payload)?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /api/events/{id} (admin)
pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<i64>,
    Json(payload): Json<EventInput>,
) -> Result<Json<Event>, ApiError> {
    policy::require_admin(&claims)?;
    validate(&payload)?;

    Ok(Json(state.events.update(event_id, &payload)?))
}

/// DELETE /api/events/{id} (admin)
pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    policy::require_admin(&claims)?;

    state.events.delete(event_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/events/{id}/register
pub async fn register(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let account_id = policy::account_id(&claims)?;
    state.events.register(event_id, account_id)?;
    Ok(Json(json!({ "message": "Registered for event" })))
}

/// DELETE /api/events/{id}/unregister
pub async fn unregister(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let account_id = policy::account_id(&claims)?;
    state.events.unregister(event_id, account_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/events/my-events
pub async fn my_events(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let account_id = policy::account_id(&claims)?;
    Ok(Json(state.events.list_for_account(account_id)?))
}
