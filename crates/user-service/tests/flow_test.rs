//! 数据库集成测试
//!
//! 需要已执行迁移的 PostgreSQL（`TEST_DATABASE_URL`）。
//! 登录种子账号的用例还需要先运行 `easybuy seed`。
//!
//! 运行方式：
//!   cargo test -p easybuy-user-service --test flow_test -- --ignored

mod common;

use axum::Router;
use axum::http::{Method, StatusCode};
use common::{live_app, send};
use easybuy_shared::test_utils::{
    TestAssertions, TestDataGenerator, admin_token, test_email, test_jwt_manager,
    test_product_name,
};
use serde_json::{Value, json};

/// 注册新用户，返回 (token, user_id, email)
async fn register(app: &Router) -> (String, i64, String) {
    let email = test_email();
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(TestDataGenerator::register(&email, "secret123")),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {:?}", body);

    let token = body["data"]["token"].as_str().unwrap().to_string();
    let user_id = body["data"]["user"]["id"].as_i64().unwrap();
    (token, user_id, email)
}

/// 以管理员身份创建商品，返回商品 ID
async fn create_product(app: &Router, stock: i32) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/admin/products",
        Some(&admin_token(1)),
        Some(TestDataGenerator::product(&test_product_name(), "150000", stock)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create product failed: {:?}", body);
    body["data"]["id"].as_i64().unwrap()
}

fn default_count(addresses: &Value) -> usize {
    addresses
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["isDefault"] == true)
        .count()
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接和种子数据"]
async fn test_seeded_login_lists_addresses_default_first() {
    let app = live_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(TestDataGenerator::login("test@example.com", "123456")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::GET, "/api/user/addresses", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let addresses = body["data"].as_array().unwrap();
    assert!(addresses.len() >= 2);
    assert_eq!(addresses[0]["isDefault"], true);
    assert_eq!(default_count(&body["data"]), 1);
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_login_token_identifies_user() {
    let app = live_app().await;
    let (_, user_id, email) = register(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(TestDataGenerator::login(&email, "secret123")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let token = body["data"]["token"].as_str().unwrap();
    let claims = test_jwt_manager().verify_token(token).unwrap();
    assert_eq!(claims.user_id().unwrap(), user_id);
    assert_eq!(claims.email, email);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(TestDataGenerator::login(&email, "wrong-password")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    TestAssertions::assert_error_code(&body, "INVALID_CREDENTIALS");
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_duplicate_registration_conflicts() {
    let app = live_app().await;
    let (_, _, email) = register(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(TestDataGenerator::register(&email, "secret123")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    TestAssertions::assert_error_code(&body, "EMAIL_EXISTS");
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_wishlist_duplicate_never_creates_second_row() {
    let app = live_app().await;
    let (token, _, _) = register(&app).await;
    let product_id = create_product(&app, 10).await;

    let request = json!({ "productId": product_id });
    let (status, _) = send(&app, Method::POST, "/api/wishlist", Some(&token), Some(request.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::POST, "/api/wishlist", Some(&token), Some(request)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    TestAssertions::assert_error_code(&body, "ALREADY_IN_WISHLIST");

    let (_, body) = send(&app, Method::GET, "/api/wishlist", Some(&token), None).await;
    let items = body["data"].as_array().unwrap();
    assert_eq!(
        items.iter().filter(|i| i["productId"] == product_id).count(),
        1
    );

    let uri = format!("/api/wishlist/{}", product_id);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    TestAssertions::assert_error_code(&body, "NOT_IN_WISHLIST");
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_at_most_one_default_address() {
    let app = live_app().await;
    let (token, _, _) = register(&app).await;

    let mut ids = Vec::new();
    for (name, is_default) in [("First", false), ("Second", true), ("Third", false)] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/user/addresses",
            Some(&token),
            Some(TestDataGenerator::address(name, is_default)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        ids.push(body["data"]["id"].as_i64().unwrap());
    }

    let (_, body) = send(&app, Method::GET, "/api/user/addresses", Some(&token), None).await;
    assert_eq!(default_count(&body["data"]), 1);
    assert_eq!(body["data"][0]["id"], ids[1]);

    // 设置第三个为默认
    let uri = format!("/api/user/addresses/{}/default", ids[2]);
    let (status, _) = send(&app, Method::PUT, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/user/addresses", Some(&token), None).await;
    assert_eq!(default_count(&body["data"]), 1);
    assert_eq!(body["data"][0]["id"], ids[2]);

    // 删除默认地址后，剩余地址中最新的成为默认
    let uri = format!("/api/user/addresses/{}", ids[2]);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/user/addresses", Some(&token), None).await;
    assert_eq!(default_count(&body["data"]), 1);
    assert_eq!(body["data"][0]["id"], ids[1]);
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_concurrent_default_changes_all_succeed() {
    let app = live_app().await;
    let (token, _, _) = register(&app).await;

    let mut ids = Vec::new();
    for name in ["Home", "Office"] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/user/addresses",
            Some(&token),
            Some(TestDataGenerator::address(name, false)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        ids.push(body["data"]["id"].as_i64().unwrap());
    }

    let first = format!("/api/user/addresses/{}/default", ids[0]);
    let second = format!("/api/user/addresses/{}/default", ids[1]);
    for _ in 0..20 {
        let (a, b) = tokio::join!(
            send(&app, Method::PUT, &first, Some(&token), None),
            send(&app, Method::PUT, &second, Some(&token), None),
        );
        assert_eq!(a.0, StatusCode::OK, "{:?}", a.1);
        assert_eq!(b.0, StatusCode::OK, "{:?}", b.1);

        let (_, body) = send(&app, Method::GET, "/api/user/addresses", Some(&token), None).await;
        assert_eq!(default_count(&body["data"]), 1);
    }
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_password_reset_code_is_single_use() {
    let app = live_app().await;
    let (_, _, email) = register(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/forgot-password",
        None,
        Some(json!({ "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let otp = body["data"]["otp"].as_str().unwrap().to_string();

    let reset = json!({ "email": email, "otp": otp, "newPassword": "newsecret456" });
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/reset-password",
        None,
        Some(reset.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/reset-password",
        None,
        Some(reset),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    TestAssertions::assert_error_code(&body, "OTP_NO_LONGER_VALID");
    assert_eq!(body["message"], "One-time code is no longer valid");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(TestDataGenerator::login(&email, "newsecret456")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_forgot_password_unknown_email_has_same_shape() {
    let app = live_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/forgot-password",
        None,
        Some(json!({ "email": test_email() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["otp"].is_null());
    TestAssertions::assert_json_has_field(&body["data"], "expiresInSecs");
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_search_without_match_returns_empty_page() {
    let app = live_app().await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/products?search=xyz123nonexistent",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"], json!([]));
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_huge_page_number_returns_empty_page() {
    let app = live_app().await;
    create_product(&app, 3).await;
    let (token, _, _) = register(&app).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/products?page=9223372036854775807&limit=100",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "products: {:?}", body);
    assert_eq!(body["data"]["items"], json!([]));
    assert_eq!(body["data"]["page"], i64::MAX);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/notifications?page=9223372036854775807&limit=100",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "notifications: {:?}", body);
    assert_eq!(body["data"]["items"], json!([]));
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_cart_rejects_quantity_beyond_stock() {
    let app = live_app().await;
    let (token, _, _) = register(&app).await;
    let product_id = create_product(&app, 3).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cart",
        Some(&token),
        Some(json!({ "productId": product_id, "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["itemCount"], 2);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cart",
        Some(&token),
        Some(json!({ "productId": product_id, "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    TestAssertions::assert_error_code(&body, "INSUFFICIENT_STOCK");
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_first_image_becomes_primary() {
    let app = live_app().await;
    let product_id = create_product(&app, 1).await;
    let admin = admin_token(1);
    let uri = format!("/api/admin/products/{}/images", product_id);

    let (_, first) = send(
        &app,
        Method::POST,
        &uri,
        Some(&admin),
        Some(json!({ "imageUrl": "https://cdn.example.com/a.jpg" })),
    )
    .await;
    assert_eq!(first["data"]["isPrimary"], true);

    let (_, second) = send(
        &app,
        Method::POST,
        &uri,
        Some(&admin),
        Some(json!({ "imageUrl": "https://cdn.example.com/b.jpg" })),
    )
    .await;
    assert_eq!(second["data"]["isPrimary"], false);

    let (_, detail) = send(
        &app,
        Method::GET,
        &format!("/api/products/{}", product_id),
        None,
        None,
    )
    .await;
    let images = detail["data"]["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["id"], first["data"]["id"]);
}
