//! Bearer-token middleware.
//!
//! Validates the `Authorization: Bearer <token>` header and inserts the
//! decoded claims into request extensions. Handlers receive the caller's
//! identity explicitly through an `Extension<Claims>` extractor; nothing
//! reads it from ambient global state.

use crate::{auth::jwt::JwtHandler, errors::ApiError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

pub async fn auth_middleware(
    State(jwt): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthenticated)?
        .to_string();

    let claims = jwt
        .validate(&token)
        .map_err(|_| ApiError::Unauthenticated)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::{Claims, RoleName};
    use axum::{body::Body, http::Request as HttpRequest};

    #[test]
    fn test_claims_travel_through_extensions() {
        let mut req = HttpRequest::new(Body::empty());
        assert!(req.extensions().get::<Claims>().is_none());

        let claims = Claims {
            sub: "7".to_string(),
            email: "test@example.com".to_string(),
            role: RoleName::User,
            exp: 1234567890,
        };
        req.extensions_mut().insert(claims);

        let found = req.extensions().get::<Claims>().unwrap();
        assert_eq!(found.sub, "7");
        assert_eq!(found.role, RoleName::User);
    }
}
