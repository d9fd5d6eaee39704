//! Submission endpoints. Creation and self-listing are open to any
//! authenticated account; review (status changes, global listing) is
//! admin-only; item access is owner-or-admin.

use crate::{
    auth::{models::Claims, policy},
    errors::ApiError,
    server::AppState,
    store::submissions::{Submission, SubmissionInput, SubmissionStatus},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: SubmissionStatus,
}

/// GET /api/submissions (admin)
pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Submission>>, ApiError> {
    policy::require_admin(&claims)?;
    Ok(Json(state.submissions.list()?))
}

/// GET /api/submissions/by-status/{status} (admin)
pub async fn list_by_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(status): Path<String>,
) -> Result<Json<Vec<Submission>>, ApiError> {
    policy::require_admin(&claims)?;

    let status = SubmissionStatus::from_str(&status)
        .ok_or_else(|| ApiError::Validation("Unknown submission status".to_string()))?;

    Ok(Json(state.submissions.list_by_status(status)?))
}

/// GET /api/submissions/my-submissions
pub async fn my_submissions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Submission>>, ApiError> {
    let account_id = policy::account_id(&claims)?;
    Ok(Json(state.submissions.list_for_account(account_id)?))
}

/// GET /api/submissions/{id} (owner or admin)
pub async fn get(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(submission_id): Path<i64>,
) -> Result<Json<Submission>, ApiError> {
    let submission = state
        .submissions
        .find_by_id(submission_id)?
        .ok_or(ApiError::NotFound("Submission"))?;
    policy::require_owner_or_admin(&claims, submission.account_id)?;

    Ok(Json(submission))
}

/// POST /api/submissions
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmissionInput>,
) -> Result<(StatusCode, Json<Submission>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }

    let account_id = policy::account_id(&claims)?;
    let submission = state.submissions.create(account_id, &payload)?;
    Ok((StatusCode::CREATED, Json(submission)))
}

/// PUT /api/submissions/{id} (owner or admin)
pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(submission_id): Path<i64>,
    Json(payload): Json<SubmissionInput>,
) -> Result<Json<Submission>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }

    let submission = state
        .submissions
        .find_by_id(submission_id)?
        .ok_or(ApiError::NotFound("Submission"))?;
    policy::require_owner_or_admin(&claims, submission.account_id)?;

    Ok(Json(state.submissions.update(submission_id, &payload)?))
}

/// PUT /api/submissions/{id}/status (admin)
pub async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(submission_id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Submission>, ApiError> {
    policy::require_admin(&claims)?;

    Ok(Json(
        state
            .submissions
            .update_status(submission_id, payload.status)?,
    ))
}

/// DELETE /api/submissions/{id} (owner or admin)
pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(submission_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let submission = state
        .submissions
        .find_by_id(submission_id)?
        .ok_or(ApiError::NotFound("Submission"))?;
    policy::require_owner_or_admin(&claims, submission.account_id)?;

    state.submissions.delete(submission_id)?;
    Ok(StatusCode::NO_CONTENT)
}
