//! Account profile and admin account management endpoints.

use crate::{
    auth::{
        models::{AccountResponse, Claims, UpdateProfileRequest},
        policy,
    },
    errors::ApiError,
    server::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

/// GET /api/users/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account_id = policy::account_id(&claims)?;
    let account = state
        .accounts
        .find_by_id(account_id)?
        .ok_or(ApiError::NotFound("Account"))?;
    Ok(Json(AccountResponse::from_account(&account)))
}

/// PUT /api/users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account_id = policy::account_id(&claims)?;
    let account = state.accounts.update_profile(account_id, &payload)?;
    Ok(Json(AccountResponse::from_account(&account)))
}

/// GET /api/users (admin)
pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    policy::require_admin(&claims)?;

    let accounts = state.accounts.list()?;
    let response = accounts.iter().map(AccountResponse::from_account).collect();
    Ok(Json(response))
}

/// GET /api/users/{id} (admin)
pub async fn get_account(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(account_id): Path<i64>,
) -> Result<Json<AccountResponse>, ApiError> {
    policy::require_admin(&claims)?;

    let account = state
        .accounts
        .find_by_id(account_id)?
        .ok_or(ApiError::NotFound("Account"))?;
    Ok(Json(AccountResponse::from_account(&account)))
}

/// PUT /api/users/{id} (admin)
pub async fn update_account(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(account_id): Path<i64>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    policy::require_admin(&claims)?;

    let account = state.accounts.update_profile(account_id, &payload)?;
    Ok(Json(AccountResponse::from_account(&account)))
}

/// DELETE /api/users/{id} (admin)
///
/// Removes the account together with everything it owns: memberships,
/// event registrations, journals, submissions, and transactions. Dependents
/// go first and the account row last, so an interrupted cascade can be
/// retried.
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(account_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    policy::require_admin(&claims)?;

    if policy::account_id(&claims)? == account_id {
        return Err(ApiError::Validation(
            "Cannot delete your own account".to_string(),
        ));
    }

    state
        .accounts
        .find_by_id(account_id)?
        .ok_or(ApiError::NotFound("Account"))?;

    state.communities.remove_memberships_for_account(account_id)?;
    state.events.remove_registrations_for_account(account_id)?;
    state.journals.delete_for_account(account_id)?;
    state.submissions.delete_for_account(account_id)?;
    state.transactions.delete_for_account(account_id)?;
    state.accounts.delete(account_id)?;

    Ok(StatusCode::NO_CONTENT)
}
