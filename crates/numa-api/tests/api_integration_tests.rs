//! Integration tests driving the router end to end (no live providers —
//! `AppState::test()` wires a fully deterministic Orchestrator).

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use numa_api::{
    create_router,
    extractors::OWNER_HEADER,
    state::{ApiConfig, AppState},
};

async fn send(
    router: axum::Router,
    method: &str,
    uri: &str,
    owner: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(owner) = owner {
        builder = builder.header(OWNER_HEADER, owner);
    }
    let request = if let Some(body) = body {
        builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    } else {
        builder.body(Body::empty()).unwrap()
    };

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register_owner(router: axum::Router) -> String {
    let (status, body) = send(
        router,
        "POST",
        "/v1/users",
        None,
        Some(json!({"credential_hash": "hash"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["owner_id"].as_str().unwrap().to_string()
}

fn router() -> axum::Router {
    create_router(Arc::new(AppState::test()), ApiConfig::default())
}

#[tokio::test]
async fn health_check_is_ok() {
    let (status, body) = send(router(), "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn text_message_without_owner_header_is_unauthorized() {
    let (status, _) = send(
        router(),
        "POST",
        "/v1/messages/text",
        None,
        Some(json!({"text": "Gasté 100 en comida"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn text_message_write_log_produces_transaction_envelope() {
    let app = router();
    let owner = register_owner(app.clone()).await;

    let (status, body) = send(
        app,
        "POST",
        "/v1/messages/text",
        Some(&owner),
        Some(json!({"text": "Gasté 500 pesos en el súper"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "transaction");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn list_transactions_returns_what_was_written() {
    let app = router();
    let owner = register_owner(app.clone()).await;

    send(
        app.clone(),
        "POST",
        "/v1/messages/text",
        Some(&owner),
        Some(json!({"text": "Gasté 100 en luz"})),
    )
    .await;

    let (status, body) = send(app, "GET", "/v1/transactions", Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn manual_verify_cross_tenant_is_not_found() {
    let app = router();
    let owner_a = register_owner(app.clone()).await;
    let owner_b = register_owner(app.clone()).await;

    let (_, created) = send(
        app.clone(),
        "POST",
        "/v1/messages/text",
        Some(&owner_a),
        Some(json!({"text": "Gasté 50 en algo"})),
    )
    .await;
    let id = created["data"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        app,
        "POST",
        &format!("/v1/transactions/{id}/verify/manual"),
        Some(&owner_b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "error");
    assert_eq!(body["error_kind"], "not_owner");
}

#[tokio::test]
async fn list_transactions_with_unrecognized_period_is_bad_request() {
    let app = router();
    let owner = register_owner(app.clone()).await;

    let (status, _) = send(
        app,
        "GET",
        "/v1/transactions?period=yesterday",
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cors_enabled_adds_allow_origin_header() {
    let app = create_router(Arc::new(AppState::test()), ApiConfig::default());
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .header("origin", "https://numa.app")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn cors_disabled_omits_allow_origin_header() {
    let app = create_router(
        Arc::new(AppState::test()),
        ApiConfig { enable_cors: false, cors_origins: vec![] },
    );
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .header("origin", "https://numa.app")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key("access-control-allow-origin"));
}
