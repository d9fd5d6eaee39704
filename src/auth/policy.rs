//! Authorization policies.
//!
//! Two checks, composed per endpoint: a role policy (operation requires
//! ADMIN) and an ownership policy (operation requires the caller to own the
//! resource, with admins bypassing ownership uniformly). Both fail closed:
//! callers run them before touching the underlying resource.

use crate::{
    auth::models::{Claims, RoleName},
    errors::ApiError,
};

/// Parse the caller's account id out of the claims.
pub fn account_id(claims: &Claims) -> Result<i64, ApiError> {
    claims
        .sub
        .parse::<i64>()
        .map_err(|_| ApiError::Unauthenticated)
}

/// Role policy: the operation requires the ADMIN role.
pub fn require_admin(claims: &Claims) -> Result<(), ApiError> {
    match claims.role {
        RoleName::Admin => Ok(()),
        RoleName::User => Err(ApiError::Forbidden),
    }
}

pub fn is_admin(claims: &Claims) -> bool {
    claims.role == RoleName::Admin
}

/// Ownership policy: the caller must own the resource or hold ADMIN.
pub fn require_owner_or_admin(claims: &Claims, owner_id: i64) -> Result<(), ApiError> {
    if is_admin(claims) || account_id(claims)? == owner_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, role: RoleName) -> Claims {
        Claims {
            sub: sub.to_string(),
            email: "test@example.com".to_string(),
            role,
            exp: 9999999999,
        }
    }

    #[test]
    fn test_admin_passes_role_policy() {
        assert!(require_admin(&claims("1", RoleName::Admin)).is_ok());
    }

    #[test]
    fn test_user_denied_by_role_policy() {
        let result = require_admin(&claims("1", RoleName::User));
        assert!(matches!(result, Err(ApiError::Forbidden)));
    }

    #[test]
    fn test_owner_passes_ownership_policy() {
        assert!(require_owner_or_admin(&claims("7", RoleName::User), 7).is_ok());
    }

    #[test]
    fn test_non_owner_denied_by_ownership_policy() {
        let result = require_owner_or_admin(&claims("7", RoleName::User), 8);
        assert!(matches!(result, Err(ApiError::Forbidden)));
    }

    #[test]
    fn test_admin_bypasses_ownership() {
        assert!(require_owner_or_admin(&claims("1", RoleName::Admin), 999).is_ok());
    }

    #[test]
    fn test_malformed_subject_is_unauthenticated() {
        let result = account_id(&claims("not-a-number", RoleName::User));
        assert!(matches!(result, Err(ApiError::Unauthenticated)));
    }
}
