//! Authentication endpoints: login, register, me, logout.

use crate::{
    auth::{
        models::{
            AccountResponse, Claims, LoginRequest, LoginResponse, RegisterRequest, RoleName,
        },
        policy,
    },
    errors::ApiError,
    server::AppState,
    store::accounts::NewAccount,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};
use tracing::{info, warn};

/// POST /api/auth/login
///
/// Unknown email and wrong password are indistinguishable to the client:
/// both yield the same 401 and the same message.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(ApiError::Validation("Email is required".to_string()));
    }
    if payload.password.is_empty() {
        return Err(ApiError::Validation("Password is required".to_string()));
    }

    info!("Login attempt for {}", email);

    let account = state
        .accounts
        .verify_credentials(email, &payload.password)
        .map_err(ApiError::internal)?
        .ok_or_else(|| {
            warn!("Failed login attempt for {}", email);
            ApiError::InvalidCredentials
        })?;

    let (token, expires_in) = state.jwt.issue(&account).map_err(ApiError::internal)?;

    info!("Login successful for {} ({})", email, account.role.as_str());

    Ok(Json(LoginResponse {
        token,
        expires_in,
        id: account.account_id,
        name: account.name,
        email: account.email,
        role: account.role,
    }))
}

/// POST /api/auth/register
///
/// Self-service registration; new accounts always get the USER role.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let name = payload.name.trim();
    let email = payload.email.trim();

    if name.is_empty() {
        return Err(ApiError::Validation("Name is required".to_string()));
    }
    if email.is_empty() {
        return Err(ApiError::Validation("Email is required".to_string()));
    }
    if !email.contains('@') {
        return Err(ApiError::Validation("Email is not valid".to_string()));
    }
    if payload.password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    info!("Registration attempt for {}", email);

    // Empty member id means "not provided".
    let member_id = payload
        .member_id
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    let account = state.accounts.create_account(NewAccount {
        name: name.to_string(),
        email: email.to_string(),
        password: payload.password,
        member_id,
        phone: payload.phone,
        birth_date: payload.birth_date,
        gender: payload.gender,
        province: payload.province,
        city: payload.city,
        role: RoleName::User,
    })?;

    info!("Account registered for {}", email);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "account": AccountResponse::from_account(&account),
            "message": "Registration successful",
        })),
    ))
}

/// GET /api/auth/me
///
/// Resolves the caller's account fresh from the store so profile updates
/// show up even with an older token.
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account_id = policy::account_id(&claims)?;

    // A token can outlive its account; treat that as unauthenticated.
    let account = state
        .accounts
        .find_by_id(account_id)?
        .ok_or(ApiError::Unauthenticated)?;

    Ok(Json(AccountResponse::from_account(&account)))
}

/// POST /api/auth/logout
///
/// Tokens are stateless and there is no server-side revocation list, so
/// logout only acknowledges; the token stays valid until its natural
/// expiry and clients are expected to discard it.
pub async fn logout() -> Json<Value> {
    Json(json!({ "message": "Logout successful" }))
}
