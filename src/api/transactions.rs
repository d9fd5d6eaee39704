//! Transaction endpoints. Creation and self-listing are open to any
//! authenticated account; the global listing and deletion are admin-only;
//! item access and updates are owner-or-admin.

use crate::{
    auth::{models::Claims, policy},
    errors::ApiError,
    server::AppState,
    store::transactions::{Transaction, TransactionInput},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

fn validate(input: &TransactionInput) -> Result<(), ApiError> {
    if input.transaction_type.trim().is_empty() {
        return Err(ApiError::Validation(
            "Transaction type is required".to_string(),
        ));
    }
    if !input.amount.is_finite() || input.amount < 0.0 {
        return Err(ApiError::Validation(
            "Amount must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/transactions (admin)
pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    policy::require_admin(&claims)?;
    Ok(Json(state.transactions.list()?))
}

/// GET /api/transactions/my-transactions
pub async fn my_transactions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let account_id = policy::account_id(&claims)?;
    Ok(Json(state.transactions.list_for_account(account_id)?))
}

/// GET /api/transactions/{id} (owner or admin)
pub async fn get(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(transaction_id): Path<i64>,
) -> Result<Json<Transaction>, ApiError> {
    let transaction = state
        .transactions
        .find_by_id(transaction_id)?
        .ok_or(ApiError::NotFound("Transaction"))?;
    policy::require_owner_or_admin(&claims, transaction.account_id)?;

    Ok(Json(transaction))
}

/// POST /api/transactions
///
/// The caller always becomes the owner; the body cannot assign the
/// transaction to someone else.
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<TransactionInput>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    validate(&payload)?;

    let account_id = policy::account_id(&claims)?;
    let transaction = state.transactions.create(account_id, &payload)?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// PUT /api/transactions/{id} (owner or admin)
pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(transaction_id): Path<i64>,
    Json(payload): Json<TransactionInput>,
) -> Result<Json<Transaction>, ApiError> {
    validate(&payload)?;

    let transaction = state
        .transactions
        .find_by_id(transaction_id)?
        .ok_or(ApiError::NotFound("Transaction"))?;
    policy::require_owner_or_admin(&claims, transaction.account_id)?;

    Ok(Json(state.transactions.update(transaction_id, &payload)?))
}

/// DELETE /api/transactions/{id} (admin)
pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(transaction_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    policy::require_admin(&claims)?;

    state.transactions.delete(transaction_id)?;
    Ok(StatusCode::NO_CONTENT)
}
