//! 集成测试公共工具

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use easybuy_shared::{
    cache::Cache,
    config::RedisConfig,
    database::Database,
    test_utils::{bearer, test_app_config, test_database_config},
};
use easybuy_user_service::{routes, state::AppState};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// 不连接数据库的应用：连接池惰性创建，Redis 指向不可达端口
///
/// 只能用于在访问数据库之前就返回的路径（认证、鉴权、参数校验）
pub fn offline_app() -> Router {
    let config = test_app_config("user-service");
    let db = Database::connect_lazy(&test_database_config()).expect("lazy pool");
    let cache = Cache::new(&RedisConfig {
        url: "redis://127.0.0.1:1".to_string(),
        pool_size: 1,
    })
    .expect("redis client");
    let state = AppState::new(db.pool().clone(), Arc::new(cache), &config);
    routes::app(state, &config.server)
}

/// 连接测试数据库的应用
pub async fn live_app() -> Router {
    let config = test_app_config("user-service");
    let db = Database::connect(&config.database)
        .await
        .expect("connect TEST_DATABASE_URL");
    let cache = Cache::new(&config.redis).expect("redis client");
    let state = AppState::new(db.pool().clone(), Arc::new(cache), &config);
    routes::app(state, &config.server)
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
