//! Health, metrics, docs, headers, rate limits and the recovery endpoint's fixed answer.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use backoffice_service::handlers::auth::FORGOT_PASSWORD_MESSAGE;
use backoffice_service::services::MockNotifier;
use common::{
    app_with, body_json, body_text, get, json_request, offline_app, send, test_config,
    UNREACHABLE_DATABASE_URL,
};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn health_reports_unavailable_without_a_database() {
    let app = offline_app().await;
    let response = send(&app, get("/health")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Service unavailable");
}

#[tokio::test]
async fn metrics_are_exposed_as_text() {
    let app = offline_app().await;
    // One request so the HTTP counters have a sample
    send(&app, get("/api/reports/top-products?topN=0")).await;

    let response = send(&app, get("/metrics")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.contains("http_requests_total"));
}

#[tokio::test]
async fn openapi_document_lists_the_api() {
    let app = offline_app().await;
    let response = send(&app, get("/.well-known/openapi.json")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let doc = body_json(response).await;
    assert!(doc["paths"]["/api/students"].is_object());
    assert!(doc["paths"]["/api/sales/{id}"].is_object());
    assert!(doc["components"]["schemas"]["ErrorResponse"].is_object());
    assert!(doc["components"]["schemas"]["SaleRequest"]["properties"]["items"].is_object());
    assert!(doc["components"]["schemas"]["SaleItemRequest"]["properties"]["unitPrice"].is_object());
    assert!(doc["components"]["schemas"]["CreatedStudent"].is_object());
    assert!(doc["components"]["schemas"]["CreatedUser"].is_object());
    assert!(doc["paths"]["/api/students"]["post"]["responses"]["201"].is_object());
}

#[tokio::test]
async fn api_responses_carry_security_headers() {
    let app = offline_app().await;
    let response = send(&app, get("/api/reports/revenue?month=0")).await;

    let headers = response.headers();
    assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
    assert!(headers[header::CONTENT_SECURITY_POLICY]
        .to_str()
        .unwrap()
        .contains("default-src 'none'"));
    assert!(headers.contains_key(header::STRICT_TRANSPORT_SECURITY));
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = offline_app().await;
    let request = Request::builder()
        .uri("/api/reports/revenue?month=0")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.headers()["x-request-id"], "req-42");

    let minted = send(&app, get("/api/reports/revenue?month=0")).await;
    assert!(minted.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn login_is_rate_limited_per_ip() {
    let mut config = test_config(UNREACHABLE_DATABASE_URL);
    config.rate_limit.login_attempts = 1;
    config.rate_limit.login_window_seconds = 3600;
    let app = app_with(config, Arc::new(MockNotifier::new())).await;

    let attempt = || {
        Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header("content-type", "application/json")
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::from(json!({"username": "ana"}).to_string()))
            .unwrap()
    };

    let first = send(&app, attempt()).await;
    assert_eq!(first.status(), StatusCode::BAD_REQUEST);

    let second = send(&app, attempt()).await;
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(second.headers().contains_key(header::RETRY_AFTER));
    let body = body_json(second).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn forgot_password_answers_generically_when_the_database_fails() {
    let notifier = Arc::new(MockNotifier::new());
    let app = app_with(test_config(UNREACHABLE_DATABASE_URL), notifier.clone()).await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/auth/forgot-password",
            json!({"email": "nobody@example.com"}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], FORGOT_PASSWORD_MESSAGE);
    assert_eq!(body["data"], serde_json::Value::Null);
    assert!(notifier.sent_to().is_empty());
}

#[tokio::test]
async fn database_failures_are_generic_500s() {
    let app = offline_app().await;
    let response = send(&app, get("/api/dashboard/stats")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Internal server error");
}
