//! 路由层测试
//!
//! 认证、角色检查和参数校验都在访问数据库之前完成，
//! 这里使用惰性连接池，无需外部依赖

mod common;

use axum::http::{Method, StatusCode};
use common::{offline_app, send};
use easybuy_shared::test_utils::{
    TestAssertions, TestDataGenerator, admin_token, customer_token,
};
use serde_json::json;

#[tokio::test]
async fn test_health_is_public() {
    let app = offline_app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "user-service");
}

#[tokio::test]
async fn test_protected_route_without_token_is_401() {
    let app = offline_app();
    let (status, body) = send(&app, Method::GET, "/api/cart", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    TestAssertions::assert_error_code(&body, "UNAUTHORIZED");
    assert_eq!(body["message"], easybuy_shared::error::MSG_NO_TOKEN);
}

#[tokio::test]
async fn test_protected_route_with_invalid_token_is_403() {
    let app = offline_app();
    let (status, body) = send(
        &app,
        Method::GET,
        "/api/user/addresses",
        Some("not-a-jwt"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_admin_route_rejects_customer() {
    let app = offline_app();
    let token = customer_token(42);
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/products",
        Some(&token),
        Some(TestDataGenerator::product("Phone", "100000", 5)),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    TestAssertions::assert_error_code(&body, "FORBIDDEN");
}

#[tokio::test]
async fn test_admin_route_without_token_is_401() {
    let app = offline_app();
    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/admin/products/1",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_validation_runs_after_role_check() {
    let app = offline_app();
    let token = admin_token(1);
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/products",
        Some(&token),
        Some(json!({"name": "", "price": "-1", "stock": -5})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    TestAssertions::assert_field_error(&body, "name");
    TestAssertions::assert_field_error(&body, "stock");
}

#[tokio::test]
async fn test_register_validation_lists_fields() {
    let app = offline_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({"email": "not-an-email", "password": "123", "fullName": "A"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    TestAssertions::assert_field_error(&body, "email");
    TestAssertions::assert_field_error(&body, "password");
}

#[tokio::test]
async fn test_cart_quantity_out_of_range() {
    let app = offline_app();
    let token = customer_token(3);
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cart",
        Some(&token),
        Some(json!({"productId": 1, "quantity": 0})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    TestAssertions::assert_field_error(&body, "quantity");
}

#[tokio::test]
async fn test_review_rating_out_of_range() {
    let app = offline_app();
    let token = customer_token(3);
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/products/1/reviews",
        Some(&token),
        Some(json!({"rating": 6})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    TestAssertions::assert_field_error(&body, "rating");
}

#[tokio::test]
async fn test_review_post_requires_token() {
    let app = offline_app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/products/1/reviews",
        None,
        Some(json!({"rating": 5})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = offline_app();
    let request = axum::http::Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
}
