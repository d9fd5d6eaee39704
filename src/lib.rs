//! Communitas Backend Library
//!
//! Community-platform REST backend: accounts, roles, communities, events,
//! journals, submissions, and transactions behind JWT authentication and
//! role/ownership authorization. Exposed as a library so integration tests
//! and binaries can assemble the router themselves.

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod middleware;
pub mod seed;
pub mod server;
pub mod store;
