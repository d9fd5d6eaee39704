//! Account, role, and auth wire models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Permission tier. Every account holds exactly one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoleName {
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "USER")]
    User,
}

impl RoleName {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Admin => "ADMIN",
            RoleName::User => "USER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Some(RoleName::Admin),
            "USER" => Some(RoleName::User),
            _ => None,
        }
    }
}

/// Named permission tier as stored in the roles table.
#[derive(Debug, Clone, Serialize)]
pub struct Role {
    pub role_id: i64,
    pub name: RoleName,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    #[serde(rename = "male")]
    Male,
    #[serde(rename = "female")]
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// A registered identity.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub account_id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub member_id: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub role: RoleName,
    pub created_at: String,
    pub updated_at: String,
}

/// JWT claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // account id
    pub email: String,
    pub role: RoleName,
    pub exp: usize, // expiration timestamp
}

/// Login request body. Fields default to empty so missing fields surface
/// as a 400 validation error rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: usize, // seconds until expiration
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: RoleName,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub member_id: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub province: Option<String>,
    pub city: Option<String>,
}

/// Account response (sanitized, no credential material).
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub member_id: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub role: RoleName,
    pub created_at: String,
    pub updated_at: String,
}

impl AccountResponse {
    pub fn from_account(account: &Account) -> Self {
        Self {
            id: account.account_id,
            name: account.name.clone(),
            email: account.email.clone(),
            member_id: account.member_id.clone(),
            phone: account.phone.clone(),
            birth_date: account.birth_date,
            gender: account.gender,
            province: account.province.clone(),
            city: account.city.clone(),
            role: account.role,
            created_at: account.created_at.clone(),
            updated_at: account.updated_at.clone(),
        }
    }
}

/// Profile update body, shared by self-service and admin updates.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub province: Option<String>,
    pub city: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        let admin = RoleName::Admin;
        let json = serde_json::to_string(&admin).unwrap();
        assert_eq!(json, r#""ADMIN""#);

        let user: RoleName = serde_json::from_str(r#""USER""#).unwrap();
        assert_eq!(user, RoleName::User);
    }

    #[test]
    fn test_role_string_conversion() {
        assert_eq!(RoleName::Admin.as_str(), "ADMIN");
        assert_eq!(RoleName::from_str("admin"), Some(RoleName::Admin));
        assert_eq!(RoleName::from_str("USER"), Some(RoleName::User));
        assert_eq!(RoleName::from_str("superuser"), None);
    }

    #[test]
    fn test_login_request_missing_fields_default_to_empty() {
        let req: LoginRequest = serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();
        assert_eq!(req.email, "a@x.com");
        assert!(req.password.is_empty());
    }

    #[test]
    fn test_account_never_serializes_password_hash() {
        let account = Account {
            account_id: 1,
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            member_id: None,
            phone: None,
            birth_date: None,
            gender: None,
            province: None,
            city: None,
            role: RoleName::User,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        };

        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("secret"));
    }
}
