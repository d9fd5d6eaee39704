//! API error taxonomy.
//!
//! Every failure a handler can produce maps to one of these variants, and
//! each variant maps to a single HTTP status with a JSON `{message}` body.
//! Internal failures are logged server-side with their cause and surface
//! only a generic message to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::store::StoreError;

#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed input. 400 with a field-level message.
    Validation(String),
    /// Wrong email or password. Always the same message regardless of
    /// which field was wrong.
    InvalidCredentials,
    /// Missing, malformed, or expired bearer token.
    Unauthenticated,
    /// Authenticated but not permitted.
    Forbidden,
    /// The addressed resource does not exist.
    NotFound(&'static str),
    /// Unique-constraint collision (email, member id, membership).
    Duplicate(String),
    /// Unexpected failure. Cause is logged, client sees a generic message.
    Internal,
}

impl ApiError {
    pub fn internal(err: impl std::fmt::Display) -> Self {
        error!("Internal error: {}", err);
        ApiError::Internal
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
            ),
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Insufficient permissions".to_string(),
            ),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            ApiError::Duplicate(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => {
                ApiError::Duplicate("Email already registered".to_string())
            }
            StoreError::DuplicateMemberId => {
                ApiError::Duplicate("Member ID already registered".to_string())
            }
            StoreError::AlreadyJoined => {
                ApiError::Duplicate("Already a member of this community".to_string())
            }
            StoreError::AlreadyRegistered => {
                ApiError::Duplicate("Already registered for this event".to_string())
            }
            StoreError::NotFound(what) => ApiError::NotFound(what),
            other => ApiError::internal(other),
        }
    }
}
