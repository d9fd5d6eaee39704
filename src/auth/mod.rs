//! Authentication and authorization.
//!
//! Credential verification, JWT issuance/validation, the bearer-token
//! middleware, and the role/ownership policy checks used by every
//! protected endpoint.

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod policy;

pub use jwt::JwtHandler;
pub use middleware::auth_middleware;
