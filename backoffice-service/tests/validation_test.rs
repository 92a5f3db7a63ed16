//! Requests rejected before any database work; they answer with the error envelope.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_json, get, json_request, offline_app, send};
use serde_json::json;

async fn assert_bad_request(request: Request<Body>, expected_message: &str) {
    let app = offline_app().await;
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["data"], serde_json::Value::Null);
    assert_eq!(body["message"], expected_message);
}

#[tokio::test]
async fn login_requires_a_password() {
    assert_bad_request(
        json_request("POST", "/api/auth/login", json!({"username": "anaruiz"})),
        "password is required",
    )
    .await;
}

#[tokio::test]
async fn login_rejects_malformed_json() {
    let app = offline_app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from("{\"username\":"))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn forgot_password_requires_an_email() {
    assert_bad_request(
        json_request("POST", "/api/auth/forgot-password", json!({"email": "  "})),
        "email is required",
    )
    .await;
}

#[tokio::test]
async fn change_password_requires_every_field() {
    assert_bad_request(
        json_request(
            "POST",
            "/api/auth/change-password",
            json!({"username": "anaruiz", "currentPassword": "a", "newPassword": "b"}),
        ),
        "confirmPassword is required",
    )
    .await;
}

#[tokio::test]
async fn student_writes_need_an_acting_user() {
    let student = json!({
        "firstNames": "Ana",
        "lastNames": "Ruiz",
        "email": "ana@example.com",
        "phone": "5555-0101",
        "program": "Ingeniería"
    });
    assert_bad_request(
        json_request("POST", "/api/students", student),
        "Acting user is required",
    )
    .await;
}

#[tokio::test]
async fn student_email_must_be_valid() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/students")
        .header("content-type", "application/json")
        .header("x-acting-user", "secretaria1")
        .body(Body::from(
            json!({
                "firstNames": "Ana",
                "lastNames": "Ruiz",
                "email": "not-an-email",
                "phone": "5555-0101",
                "program": "Ingeniería"
            })
            .to_string(),
        ))
        .unwrap();

    let app = offline_app().await;
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn user_role_must_be_known() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/users")
        .header("content-type", "application/json")
        .header("x-acting-user", "admin")
        .body(Body::from(
            json!({
                "firstNames": "Luis",
                "lastName": "Pérez",
                "email": "luis@example.com",
                "role": "superuser",
                "password": "Secreta#1"
            })
            .to_string(),
        ))
        .unwrap();

    let app = offline_app().await;
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_numeric_ids_are_rejected() {
    let app = offline_app().await;
    for uri in ["/api/users/abc", "/api/categories/x1", "/api/sales/ten"] {
        let response = send(&app, get(uri)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn category_name_is_required() {
    assert_bad_request(
        json_request("POST", "/api/categories", json!({"name": "   "})),
        "name is required",
    )
    .await;
}

#[tokio::test]
async fn product_prices_are_required() {
    let app = offline_app().await;
    let response = send(
        &app,
        json_request("POST", "/api/products", json!({"name": "Agua pura"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn movement_quantity_cannot_be_zero() {
    assert_bad_request(
        json_request(
            "POST",
            "/api/inventory/movements",
            json!({"productId": 3, "quantity": 0, "kind": "entry"}),
        ),
        "quantity must not be zero",
    )
    .await;
}

#[tokio::test]
async fn sale_needs_items() {
    assert_bad_request(
        json_request("POST", "/api/sales", json!({"items": []})),
        "A sale needs at least one item",
    )
    .await;
}

#[tokio::test]
async fn sales_report_needs_both_dates() {
    assert_bad_request(
        get("/api/reports/sales?dateFrom=2024-01-01"),
        "dateFrom and dateTo are required",
    )
    .await;
}

#[tokio::test]
async fn top_products_bounds() {
    assert_bad_request(
        get("/api/reports/top-products?topN=0"),
        "topN must be between 1 and 100",
    )
    .await;
}

#[tokio::test]
async fn revenue_month_bounds() {
    assert_bad_request(
        get("/api/reports/revenue?year=2024&month=13"),
        "month must be between 1 and 12",
    )
    .await;
}

#[tokio::test]
async fn malformed_dates_are_rejected() {
    let app = offline_app().await;
    let response = send(&app, get("/api/audit/access?dateFrom=10-03-2024")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
