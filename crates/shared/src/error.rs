//! 统一错误处理模块
//!
//! 定义基础设施层（数据库、缓存、认证）共享的错误类型，
//! 各服务在自己的错误枚举中通过 `From<SharedError>` 转换。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::response::error_response;

/// 无 Token 时返回的提示
pub const MSG_NO_TOKEN: &str = "Access denied, no token provided";
/// Token 签名/过期校验失败时返回的提示
pub const MSG_INVALID_TOKEN: &str = "Forbidden, invalid token";
/// 系统级错误对外统一提示
pub const MSG_INTERNAL: &str = "Internal server error, please try again later";

/// 基础设施错误类型
#[derive(Debug, Error)]
pub enum SharedError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis 错误: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),

    #[error("{}", MSG_NO_TOKEN)]
    MissingToken,

    #[error("{}", MSG_INVALID_TOKEN)]
    InvalidToken(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, SharedError>;

impl SharedError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::Redis(_) => "REDIS_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::MissingToken => "UNAUTHORIZED",
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 返回对应的 HTTP 状态码
    ///
    /// 缺少 Token 为 401；Token 无效与角色不足均为 403
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingToken => StatusCode::UNAUTHORIZED,
            Self::InvalidToken(_) | Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Database(_) | Self::Redis(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 对外展示的消息，系统级错误只返回通用提示并记录日志
    pub fn public_message(&self) -> String {
        match self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                MSG_INTERNAL.to_string()
            }
            Self::Redis(e) => {
                tracing::error!(error = %e, "Redis 操作失败");
                MSG_INTERNAL.to_string()
            }
            Self::Config(e) => {
                tracing::error!(error = %e, "配置错误");
                MSG_INTERNAL.to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                MSG_INTERNAL.to_string()
            }
            Self::InvalidToken(reason) => {
                tracing::debug!(reason = %reason, "token rejected");
                MSG_INVALID_TOKEN.to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for SharedError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.code(), self.public_message(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(SharedError::MissingToken.code(), "UNAUTHORIZED");
        assert_eq!(SharedError::InvalidToken("bad".into()).code(), "INVALID_TOKEN");
        assert_eq!(SharedError::Forbidden("x".into()).code(), "FORBIDDEN");
    }

    #[test]
    fn test_auth_status_codes() {
        assert_eq!(SharedError::MissingToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            SharedError::InvalidToken("expired".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            SharedError::Database(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_token_hides_reason() {
        let err = SharedError::InvalidToken("ExpiredSignature".into());
        assert_eq!(err.public_message(), MSG_INVALID_TOKEN);
        assert_eq!(SharedError::MissingToken.public_message(), MSG_NO_TOKEN);
    }

    #[tokio::test]
    async fn test_system_errors_hide_internal_details() {
        let response = SharedError::Internal("pool at 10.0.0.3 exhausted".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("读取响应体失败");
        let body: serde_json::Value = serde_json::from_slice(&body).expect("响应体不是合法 JSON");
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert_eq!(body["message"], MSG_INTERNAL);
        assert!(body["data"].is_null());
    }
}
