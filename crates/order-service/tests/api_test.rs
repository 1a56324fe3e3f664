//! 路由层测试
//!
//! 认证、角色检查和参数校验都在访问数据库之前完成

mod common;

use axum::http::{Method, StatusCode};
use common::{offline_app, send};
use easybuy_shared::test_utils::{TestAssertions, TestDataGenerator, admin_token, customer_token};
use serde_json::json;

#[tokio::test]
async fn test_health_reports_service_name() {
    let app = offline_app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "order-service");
}

#[tokio::test]
async fn test_orders_require_token() {
    let app = offline_app();
    let (status, body) = send(&app, Method::GET, "/api/orders", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    TestAssertions::assert_error_code(&body, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_place_order_with_invalid_token_is_403() {
    let app = offline_app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some("garbage"),
        Some(TestDataGenerator::place_order(1, None)),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_place_order_validates_address() {
    let app = offline_app();
    let token = customer_token(7);
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&token),
        Some(TestDataGenerator::place_order(0, None)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    TestAssertions::assert_field_error(&body, "address_id");
}

#[tokio::test]
async fn test_place_order_rejects_long_note() {
    let app = offline_app();
    let token = customer_token(7);
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&token),
        Some(json!({ "addressId": 3, "note": "x".repeat(501) })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    TestAssertions::assert_field_error(&body, "note");
}

#[tokio::test]
async fn test_voucher_preview_validates_subtotal() {
    let app = offline_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/vouchers/validate",
        None,
        Some(json!({ "code": "SAVE10", "subtotal": "-1" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    TestAssertions::assert_field_error(&body, "subtotal");
}

#[tokio::test]
async fn test_admin_orders_reject_customer() {
    let app = offline_app();
    let token = customer_token(7);
    let (status, body) = send(&app, Method::GET, "/api/admin/orders", Some(&token), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    TestAssertions::assert_error_code(&body, "FORBIDDEN");
}

#[tokio::test]
async fn test_admin_voucher_percentage_over_100() {
    let app = offline_app();
    let token = admin_token(1);
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/vouchers",
        Some(&token),
        Some(TestDataGenerator::percentage_voucher("TOOMUCH", "150", None)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    TestAssertions::assert_field_error(&body, "discount_value");
}

#[tokio::test]
async fn test_admin_voucher_short_code() {
    let app = offline_app();
    let token = admin_token(1);
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/vouchers",
        Some(&token),
        Some(TestDataGenerator::percentage_voucher("AB", "10", None)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    TestAssertions::assert_field_error(&body, "code");
}

#[tokio::test]
async fn test_admin_status_update_rejects_unknown_status() {
    let app = offline_app();
    let token = admin_token(1);
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/admin/orders/1/status",
        Some(&token),
        Some(json!({ "status": "lost" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
