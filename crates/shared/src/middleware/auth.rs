//! JWT 认证中间件
//!
//! 验证请求中的 Bearer Token 并将用户信息注入请求扩展

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{Claims, JwtManager};
use crate::error::SharedError;

/// 认证中间件
///
/// 从 Authorization header 中提取 Bearer Token，验证后将 Claims 注入请求扩展。
/// 只挂在需要登录的路由上（`route_layer`），公开路由不经过此中间件。
pub async fn auth_middleware(
    State(jwt): State<JwtManager>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = match bearer_token(request.headers().get(header::AUTHORIZATION)) {
        Some(token) => token.to_string(),
        None => return SharedError::MissingToken.into_response(),
    };

    match jwt.verify_token(&token) {
        Ok(claims) => {
            tracing::Span::current().record("user_id", claims.sub.as_str());
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// 从 Authorization header 值中取出 Bearer Token
///
/// 非 Bearer 方案或空 Token 视为未携带
pub fn bearer_token(value: Option<&axum::http::HeaderValue>) -> Option<&str> {
    let value = value?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// 当前登录用户
///
/// 由 `auth_middleware` 注入的 Claims 解析而来，handler 直接作为参数使用
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub claims: Claims,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.claims.is_admin()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = SharedError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or(SharedError::MissingToken)?;
        let id = claims.user_id()?;
        Ok(Self { id, claims })
    }
}
