//! 集成测试公共工具

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use easybuy_order_service::{routes, state::AppState};
use easybuy_shared::{
    cache::Cache,
    config::RedisConfig,
    database::Database,
    test_utils::{bearer, test_app_config, test_database_config, test_email, test_product_name},
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

/// 不连接数据库的应用，只能用于在访问数据库之前就返回的路径
pub fn offline_app() -> Router {
    let config = test_app_config("order-service");
    let db = Database::connect_lazy(&test_database_config()).expect("lazy pool");
    let cache = Cache::new(&RedisConfig {
        url: "redis://127.0.0.1:1".to_string(),
        pool_size: 1,
    })
    .expect("redis client");
    let state = AppState::new(db.pool().clone(), Arc::new(cache), &config).expect("shipping policy");
    routes::app(state, &config.server)
}

/// 连接测试数据库的应用，同时返回连接池用于准备数据
pub async fn live_app() -> (Router, PgPool) {
    let config = test_app_config("order-service");
    let db = Database::connect(&config.database)
        .await
        .expect("connect TEST_DATABASE_URL");
    let cache = Cache::new(&config.redis).expect("redis client");
    let pool = db.pool().clone();
    let state = AppState::new(pool.clone(), Arc::new(cache), &config).expect("shipping policy");
    (routes::app(state, &config.server), pool)
}

/// 发送请求并解析 JSON 响应
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, bearer(token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

// ==================== 数据准备 ====================
//
// 购物车和地址属于 user-service，这里直接写库

pub async fn insert_user(pool: &PgPool) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (email, password_hash, full_name) VALUES ($1, 'x', 'Order Tester') RETURNING id",
    )
    .bind(test_email())
    .fetch_one(pool)
    .await
    .unwrap();
    id
}

pub async fn insert_address(pool: &PgPool, user_id: i64) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO user_addresses (user_id, recipient_name, phone, address_line, district, city)
        VALUES ($1, 'Tran Thi B', '0912345678', '1 Le Loi', 'District 1', 'Ho Chi Minh City')
        RETURNING id
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap();
    id
}

/// 创建商品，价格为字符串形式的金额
pub async fn insert_product(pool: &PgPool, price: &str, stock: i32) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO products (name, price, stock) VALUES ($1, $2::numeric, $3) RETURNING id",
    )
    .bind(test_product_name())
    .bind(price)
    .bind(stock)
    .fetch_one(pool)
    .await
    .unwrap();
    id
}

pub async fn add_to_cart(pool: &PgPool, user_id: i64, product_id: i64, quantity: i32) {
    sqlx::query("INSERT INTO cart_items (user_id, product_id, quantity) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn stock_of(pool: &PgPool, product_id: i64) -> i32 {
    let (stock,): (i32,) = sqlx::query_as("SELECT stock FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .unwrap();
    stock
}

pub async fn cart_count(pool: &PgPool, user_id: i64) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cart_items WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap();
    count
}
