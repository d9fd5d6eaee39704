//! Application state and router assembly.

use crate::{
    api,
    auth::{api as auth_api, auth_middleware, JwtHandler},
    config::Config,
    middleware::request_logging,
    store::{
        AccountStore, CommunityStore, EventStore, JournalStore, SubmissionStore, TransactionStore,
    },
};
use anyhow::Result;
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared application state. Stores hold no connections, only the database
/// path, so cloning is cheap and requests stay independent.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountStore>,
    pub communities: Arc<CommunityStore>,
    pub events: Arc<EventStore>,
    pub journals: Arc<JournalStore>,
    pub submissions: Arc<SubmissionStore>,
    pub transactions: Arc<TransactionStore>,
    pub jwt: Arc<JwtHandler>,
}

pub fn build_state(config: &Config) -> Result<AppState> {
    let db_path = &config.database_path;

    let state = AppState {
        accounts: Arc::new(AccountStore::new(db_path)?),
        communities: Arc::new(CommunityStore::new(db_path)?),
        events: Arc::new(EventStore::new(db_path)?),
        journals: Arc::new(JournalStore::new(db_path)?),
        submissions: Arc::new(SubmissionStore::new(db_path)?),
        transactions: Arc::new(TransactionStore::new(db_path)?),
        jwt: Arc::new(JwtHandler::new(
            config.jwt_secret.clone(),
            config.token_ttl_hours,
        )),
    };

    info!("Database initialized at {}", db_path);
    Ok(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub fn build_router(state: AppState) -> Router {
    // Public: health, credential endpoints, and read-only community/event/
    // public-journal listings.
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/login", post(auth_api::login))
        .route("/api/auth/register", post(auth_api::register))
        .route("/api/auth/logout", post(auth_api::logout))
        .route("/api/communities", get(api::communities::list))
        .route("/api/communities/:id", get(api::communities::get))
        .route("/api/events", get(api::events::list))
        .route("/api/events/:id", get(api::events::get))
        .route("/api/journals/public", get(api::journals::list_public))
        .with_state(state.clone());

    // Everything below requires a valid bearer token; the middleware puts
    // the decoded claims into request extensions.
    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth_api::me))
        .route("/api/users/profile", get(api::users::get_profile))
        .route("/api/users/profile", put(api::users::update_profile))
        .route("/api/users", get(api::users::list_accounts))
        .route("/api/users/:id", get(api::users::get_account))
        .route("/api/users/:id", put(api::users::update_account))
        .route("/api/users/:id", delete(api::users::delete_account))
        .route("/api/communities", post(api::communities::create))
        .route("/api/communities/:id", put(api::communities::update))
        .route("/api/communities/:id", delete(api::communities::delete))
        .route("/api/communities/:id/join", post(api::communities::join))
        .route("/api/communities/:id/leave", delete(api::communities::leave))
        .route(
            "/api/communities/my-communities",
            get(api::communities::my_communities),
        )
        .route("/api/events", post(api::events::create))
        .route("/api/events/:id", put(api::events::update))
        .route("/api/events/:id", delete(api::events::delete))
        .route("/api/events/:id/register", post(api::events::register))
        .route("/api/events/:id/unregister", delete(api::events::unregister))
        .route("/api/events/my-events", get(api::events::my_events))
        .route("/api/journals", get(api::journals::list_all))
        .route("/api/journals", post(api::journals::create))
        .route("/api/journals/:id", get(api::journals::get))
        .route("/api/journals/:id", put(api::journals::update))
        .route("/api/journals/:id", delete(api::journals::delete))
        .route("/api/journals/my-journals", get(api::journals::my_journals))
        .route("/api/submissions", get(api::submissions::list))
        .route("/api/submissions", post(api::submissions::create))
        .route(
            "/api/submissions/by-status/:status",
            get(api::submissions::list_by_status),
        )
        .route(
            "/api/submissions/my-submissions",
            get(api::submissions::my_submissions),
        )
        .route("/api/submissions/:id", get(api::submissions::get))
        .route("/api/submissions/:id", put(api::submissions::update))
        .route(
            "/api/submissions/:id/status",
            put(api::submissions::update_status),
        )
        .route("/api/submissions/:id", delete(api::submissions::delete))
        .route("/api/transactions", get(api::transactions::list))
        .route("/api/transactions", post(api::transactions::create))
        .route(
            "/api/transactions/my-transactions",
            get(api::transactions::my_transactions),
        )
        .route("/api/transactions/:id", get(api::transactions::get))
        .route("/api/transactions/:id", put(api::transactions::update))
        .route("/api/transactions/:id", delete(api::transactions::delete))
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}
