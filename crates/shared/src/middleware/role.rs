//! 角色检查中间件
//!
//! 单一角色的平面校验，不支持角色继承或策略配置

use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::pin::Pin;

use crate::auth::{Claims, ROLE_ADMIN};
use crate::error::SharedError;

/// 角色检查中间件工厂
///
/// 必须叠加在 `auth_middleware` 之后使用
///
/// # 示例
/// ```ignore
/// .route_layer(axum::middleware::from_fn(require_role("admin")))
/// ```
pub fn require_role(
    role: &'static str,
) -> impl Fn(Request<Body>, Next) -> Pin<Box<dyn Future<Output = Response> + Send>> + Clone + Send
{
    move |request: Request<Body>, next: Next| -> Pin<Box<dyn Future<Output = Response> + Send>> {
        Box::pin(check_role(request, next, role))
    }
}

/// 管理员路由的快捷中间件
pub async fn require_admin(request: Request<Body>, next: Next) -> Response {
    check_role(request, next, ROLE_ADMIN).await
}

async fn check_role(request: Request<Body>, next: Next, required_role: &'static str) -> Response {
    let claims = match request.extensions().get::<Claims>() {
        Some(claims) => claims,
        None => return SharedError::MissingToken.into_response(),
    };

    if !role_matches(claims, required_role) {
        tracing::warn!(
            user_id = %claims.sub,
            role = %claims.role,
            required = required_role,
            "role check failed"
        );
        return SharedError::Forbidden(forbidden_message(required_role)).into_response();
    }

    next.run(request).await
}

fn role_matches(claims: &Claims, required_role: &str) -> bool {
    claims.role == required_role
}

fn forbidden_message(required_role: &str) -> String {
    format!("Forbidden, {} privileges required", required_role)
}
