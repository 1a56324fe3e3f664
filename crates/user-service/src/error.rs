//! user-service 错误类型定义
//!
//! 每个变体对应一个稳定的错误码，前端依赖错误码做分支处理

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use easybuy_shared::SharedError;
use easybuy_shared::error::MSG_INTERNAL;
use easybuy_shared::response::{FieldError, error_response, field_errors};
use serde_json::json;

use crate::otp::OtpState;

/// user-service 错误类型
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    // 认证与基础设施错误（401/403/500）
    #[error(transparent)]
    Shared(#[from] SharedError),

    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("This account has been disabled")]
    UserDisabled,
    #[error("User not found")]
    UserNotFound,
    #[error("Email is already registered")]
    EmailExists,
    #[error("Current password is incorrect")]
    IncorrectPassword,

    // 一次性验证码
    #[error("Invalid one-time code")]
    InvalidOtp,
    #[error("One-time code is no longer valid")]
    OtpNoLongerValid(OtpState),
    #[error("Too many code requests, please try again later")]
    TooManyOtpRequests,

    // 参数校验
    #[error("Validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    InvalidReference(String),

    // 资源不存在
    #[error("Product {0} not found")]
    ProductNotFound(i64),
    #[error("Address {0} not found")]
    AddressNotFound(i64),
    #[error("Product {0} is not in the cart")]
    CartItemNotFound(i64),
    #[error("Product {0} is not in the wishlist")]
    WishlistItemNotFound(i64),
    #[error("Image {0} not found")]
    ImageNotFound(i64),
    #[error("Review {0} not found")]
    ReviewNotFound(i64),
    #[error("Notification {0} not found")]
    NotificationNotFound(i64),

    // 业务冲突
    #[error("Product is already in the wishlist")]
    AlreadyInWishlist,
    #[error("You have already reviewed this product")]
    AlreadyReviewed,
    #[error("Only {available} item(s) left in stock")]
    InsufficientStock { available: i32 },

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl UserServiceError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Shared(e) => e.status_code(),

            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::UserDisabled => StatusCode::FORBIDDEN,

            Self::IncorrectPassword
            | Self::InvalidOtp
            | Self::OtpNoLongerValid(_)
            | Self::Validation(_)
            | Self::InvalidReference(_) => StatusCode::BAD_REQUEST,

            Self::TooManyOtpRequests => StatusCode::TOO_MANY_REQUESTS,

            Self::UserNotFound
            | Self::ProductNotFound(_)
            | Self::AddressNotFound(_)
            | Self::CartItemNotFound(_)
            | Self::WishlistItemNotFound(_)
            | Self::ImageNotFound(_)
            | Self::ReviewNotFound(_)
            | Self::NotificationNotFound(_) => StatusCode::NOT_FOUND,

            Self::EmailExists
            | Self::AlreadyInWishlist
            | Self::AlreadyReviewed
            | Self::InsufficientStock { .. } => StatusCode::CONFLICT,

            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Shared(e) => e.code(),
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::UserDisabled => "USER_DISABLED",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::EmailExists => "EMAIL_EXISTS",
            Self::IncorrectPassword => "INCORRECT_PASSWORD",
            Self::InvalidOtp => "INVALID_OTP",
            Self::OtpNoLongerValid(_) => "OTP_NO_LONGER_VALID",
            Self::TooManyOtpRequests => "TOO_MANY_REQUESTS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidReference(_) => "INVALID_REFERENCE",
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::AddressNotFound(_) => "ADDRESS_NOT_FOUND",
            Self::CartItemNotFound(_) => "CART_ITEM_NOT_FOUND",
            Self::WishlistItemNotFound(_) => "NOT_IN_WISHLIST",
            Self::ImageNotFound(_) => "IMAGE_NOT_FOUND",
            Self::ReviewNotFound(_) => "REVIEW_NOT_FOUND",
            Self::NotificationNotFound(_) => "NOTIFICATION_NOT_FOUND",
            Self::AlreadyInWishlist => "ALREADY_IN_WISHLIST",
            Self::AlreadyReviewed => "ALREADY_REVIEWED",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 单字段校验失败的快捷构造
    pub fn field(field: &str, message: &str) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }
}

impl IntoResponse for UserServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let (message, data) = match self {
            Self::Shared(e) => (e.public_message(), None),
            Self::Validation(errors) => (
                "Validation failed".to_string(),
                Some(json!({ "errors": errors })),
            ),
            Self::InsufficientStock { available } => (
                format!("Only {} item(s) left in stock", available),
                Some(json!({ "available": available })),
            ),
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                (MSG_INTERNAL.to_string(), None)
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                (MSG_INTERNAL.to_string(), None)
            }
            other => (other.to_string(), None),
        };

        error_response(status, code, message, data)
    }
}

/// 从 validator 错误转换，保留字段级信息
impl From<validator::ValidationErrors> for UserServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(field_errors(&errors))
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, UserServiceError>;
