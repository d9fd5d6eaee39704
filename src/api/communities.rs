//! Community endpoints. Listing and lookup are public; mutation is
//! admin-only; membership operations act on the caller's own account.

use crate::{
    auth::{models::Claims, policy},
    errors::ApiError,
    server::AppState,
    store::communities::{Community, CommunityInput},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};

/// GET /api/communities (public)
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Community>>, ApiError> {
    Ok(Json(state.communities.list()?))
}

/// GET /api/communities/{id} (public)
pub async fn get(
    State(state): State<AppState>,
    Path(community_id): Path<i64>,
) -> Result<Json<Community>, ApiError> {
    let community = state
        .communities
        .find_by_id(community_id)?
        .ok_or(ApiError::NotFound("Community"))?;
    Ok(Json(community))
}

/// POST /api/communities (admin)
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CommunityInput>,
) -> Result<(StatusCode, Json<Community>), ApiError> {
    policy::require_admin(&claims)?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("Name is required".to_string()));
    }

    let community = state.communities.create(&payload)?;
    Ok((StatusCode::CREATED, Json(community)))
}

/// PUT /api/communities/{id} (admin)
pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(community_id): Path<i64>,
    Json(payload): Json<CommunityInput>,
) -> Result<Json<Community>, ApiError> {
    policy::require_admin(&claims)?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("Name is required".to_string()));
    }

    Ok(Json(state.communities.update(community_id, &payload)?))
}

/// DELETE /api/communities/{id} (admin)
pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(community_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    policy::require_admin(&claims)?;

    state.communities.delete(community_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/communities/{id}/join
pub async fn join(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(community_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let account_id = policy::account_id(&claims)?;
    state.communities.join(community_id, account_id)?;
    Ok(Json(json!({ "message": "Joined community" })))
}

/// DELETE /api/communities/{id}/leave
pub async fn leave(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(community_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let account_id = policy::account_id(&claims)?;
    state.communities.leave(community_id, account_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/communities/my-communities
pub async fn my_communities(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Community>>, ApiError> {
    let account_id = policy::account_id(&claims)?;
    Ok(Json(state.communities.list_for_account(account_id)?))
}
