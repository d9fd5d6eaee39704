//! JWT issuance and validation.
//!
//! Tokens are stateless: validity is purely signature + expiry, there is no
//! server-side revocation list. Logout only discards client state.

use crate::auth::models::{Account, Claims};
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

pub struct JwtHandler {
    secret: String,
    ttl_hours: i64,
}

impl JwtHandler {
    pub fn new(secret: String, ttl_hours: i64) -> Self {
        Self { secret, ttl_hours }
    }

    /// Mint a signed token for an authenticated account. Returns the token
    /// string and its lifetime in seconds.
    pub fn issue(&self, account: &Account) -> Result<(String, usize)> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::hours(self.ttl_hours))
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let expires_in = (self.ttl_hours * 3600) as usize;

        let claims = Claims {
            sub: account.account_id.to_string(),
            email: account.email.clone(),
            role: account.role,
            exp: expiration,
        };

        debug!(
            "Issuing token for account {} ({}), expires in {}h",
            account.account_id, account.email, self.ttl_hours
        );

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to issue token")?;

        Ok((token, expires_in))
    }

    /// Verify signature and expiry, returning the claims. Any failure
    /// (malformed, expired, bad signature) is a single error; callers must
    /// not distinguish the reason to the client.
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .context("Invalid or expired token")?;

        Ok(decoded.claims)
    }
}
