//! End-to-end authentication flow tests against the assembled router.

mod common;

use axum::http::StatusCode;
use common::{login, register, send, setup, ADMIN_EMAIL, ADMIN_PASSWORD};
use serde_json::json;

#[tokio::test]
async fn register_then_login_then_me() {
    let (app, _db) = setup();

    let (status, body) = register(&app, "Ana", "ana@x.com", "secret1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["account"]["email"], "ana@x.com");
    assert_eq!(body["account"]["role"], "USER");
    // Credential material must never appear in a response
    assert!(body["account"].get("password_hash").is_none());

    let token = login(&app, "ana@x.com", "secret1").await;

    let (status, me) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "ana@x.com");
    assert_eq!(me["name"], "Ana");
}

#[tokio::test]
async fn login_response_carries_identity_fields() {
    let (app, _db) = setup();
    register(&app, "Ana", "ana@x.com", "secret1").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ana@x.com", "password": "secret1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().unwrap().len() > 20);
    assert!(body["id"].as_i64().unwrap() > 0);
    assert_eq!(body["name"], "Ana");
    assert_eq!(body["email"], "ana@x.com");
    assert_eq!(body["role"], "USER");
}

#[tokio::test]
async fn invalid_credentials_are_indistinguishable() {
    let (app, _db) = setup();
    register(&app, "Ana", "ana@x.com", "secret1").await;

    let (wrong_pw_status, wrong_pw_body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ana@x.com", "password": "wrong" })),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@x.com", "password": "secret1" })),
    )
    .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw_body["message"], "Invalid email or password");
    // Same error kind and same message, whichever field was wrong.
    assert_eq!(wrong_pw_body, unknown_body);
}

#[tokio::test]
async fn missing_fields_are_rejected_with_400() {
    let (app, _db) = setup();

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email is required");

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ana@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Password is required");

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "Ana", "email": "ana@x.com", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_registration_fails_second_time() {
    let (app, _db) = setup();

    let (first, _) = register(&app, "Ana", "ana@x.com", "secret1").await;
    assert_eq!(first, StatusCode::CREATED);

    let (second, body) = register(&app, "Ana Again", "ana@x.com", "secret2").await;
    assert_eq!(second, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already registered");
}

#[tokio::test]
async fn duplicate_member_id_is_rejected() {
    let (app, _db) = setup();

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "A", "email": "a@x.com", "password": "secret1", "member_id": "M001" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "B", "email": "b@x.com", "password": "secret1", "member_id": "M001" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Member ID already registered");
}

#[tokio::test]
async fn me_requires_a_valid_token() {
    let (app, _db) = setup();

    let (status, _) = send(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/auth/me", Some("garbage.token.here"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_is_a_stateless_acknowledgement() {
    let (app, _db) = setup();
    register(&app, "Ana", "ana@x.com", "secret1").await;
    let token = login(&app, "ana@x.com", "secret1").await;

    let (status, body) = send(&app, "POST", "/api/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logout successful");

    // No server-side revocation: the token still works afterwards.
    let (status, _) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn default_admin_is_seeded_and_can_log_in() {
    let (app, _db) = setup();

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "ADMIN");
}
