use axum::body::Body;
use axum::http::{Method, Request, header};
use tower::ServiceExt;

use super::*;
use crate::services::accounts::RoleMode;
use crate::services::password::PasswordStorage;
use crate::state::test_helpers::{self, MemoryAccountStore};
use std::sync::Arc;

fn test_router(role_mode: RoleMode) -> (Router, Arc<MemoryAccountStore>) {
    let (state, store) = test_helpers::test_app_state(role_mode, PasswordStorage::Plaintext);
    (app(state), store)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() { serde_json::Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// =============================================================================
// /register
// =============================================================================

#[tokio::test]
async fn register_returns_created() {
    let (router, store) = test_router(RoleMode::Required);
    let (status, body) = send(
        &router,
        post_json(
            "/register",
            &serde_json::json!({"name": "alice", "email": "a@x.com", "password": "p1", "role": "user"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, serde_json::json!({"message": "User registered successfully"}));
    assert_eq!(store.rows().len(), 1);
}

#[tokio::test]
async fn register_missing_field_is_bad_request() {
    let (router, store) = test_router(RoleMode::Required);
    let (status, body) = send(
        &router,
        post_json("/register", &serde_json::json!({"username": "alice", "email": "a@x.com", "password": "p1"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({"error": "All fields are required"}));
    assert!(store.rows().is_empty());
}

#[tokio::test]
async fn register_malformed_json_is_bad_request() {
    let (router, store) = test_router(RoleMode::Required);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({"error": "Invalid JSON body"}));
    assert!(store.rows().is_empty());
}

#[tokio::test]
async fn register_without_json_content_type_is_bad_request() {
    let (router, _store) = test_router(RoleMode::Required);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/register")
        .body(Body::from(r#"{"username":"alice"}"#))
        .unwrap();
    let (status, _body) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_store_failure_surfaces_message() {
    let (router, store) = test_router(RoleMode::Required);
    store.set_failing(true);
    let (status, body) = send(
        &router,
        post_json(
            "/register",
            &serde_json::json!({"username": "alice", "email": "a@x.com", "password": "p1", "role": "user"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], serde_json::json!(sqlx::Error::PoolTimedOut.to_string()));
}

// =============================================================================
// /login
// =============================================================================

#[tokio::test]
async fn login_missing_field_is_bad_request() {
    let (router, _store) = test_router(RoleMode::Required);
    let (status, body) = send(&router, get("/login?name=alice&password=p1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({"error": "All fields are required"}));
}

#[tokio::test]
async fn login_store_failure_hides_detail() {
    let (router, store) = test_router(RoleMode::Required);
    store.set_failing(true);
    let (status, body) = send(&router, get("/login?name=alice&password=p1&role=user")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, serde_json::json!({"error": "Server error"}));
}

#[tokio::test]
async fn login_json_body_is_accepted() {
    let (router, _store) = test_router(RoleMode::Required);
    send(
        &router,
        post_json(
            "/register",
            &serde_json::json!({"username": "alice", "email": "a@x.com", "password": "p1", "role": "user"}),
        ),
    )
    .await;

    let (status, body) = send(
        &router,
        post_json("/login", &serde_json::json!({"username": "alice", "password": "p1", "role": "user"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"message": "Login successful"}));
}

// =============================================================================
// END TO END
// =============================================================================

#[tokio::test]
async fn register_conflict_then_login_scenario() {
    let (router, store) = test_router(RoleMode::Required);

    let (status, _) = send(
        &router,
        post_json(
            "/register",
            &serde_json::json!({"username": "alice", "email": "a@x.com", "password": "p1", "role": "user"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &router,
        post_json(
            "/register",
            &serde_json::json!({"username": "alice", "email": "a2@x.com", "password": "p1", "role": "user"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, serde_json::json!({"error": "Username or Email already exists"}));
    assert_eq!(store.rows().len(), 1);

    let (status, body) = send(&router, get("/login?name=alice&password=p1&role=user")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"message": "Login successful"}));

    let (status, body) = send(&router, get("/login?name=alice&password=wrong&role=user")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, serde_json::json!({"error": "Invalid credentials"}));
}

#[tokio::test]
async fn optional_role_mode_registers_without_role() {
    let (router, _store) = test_router(RoleMode::Optional);

    let (status, _) = send(
        &router,
        post_json("/register", &serde_json::json!({"username": "alice", "email": "a@x.com", "password": "p1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&router, get("/login?username=alice&password=p1")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn register_and_login_accept_both_name_keys_together() {
    let (router, store) = test_router(RoleMode::Required);

    let (status, body) = send(
        &router,
        post_json(
            "/register",
            &serde_json::json!({
                "username": "alice",
                "name": "alice",
                "email": "a@x.com",
                "password": "p1",
                "role": "user"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body={body}");
    assert_eq!(store.rows()[0].username, "alice");

    let (status, body) = send(&router, get("/login?name=alice&username=alice&password=p1&role=user")).await;
    assert_eq!(status, StatusCode::OK, "body={body}");

    let (status, _) = send(
        &router,
        post_json(
            "/login",
            &serde_json::json!({"name": "alice", "username": "alice", "password": "p1", "role": "user"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn healthz_is_ok() {
    let (router, _store) = test_router(RoleMode::Required);
    let (status, body) = send(&router, get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::Value::Null);
}
