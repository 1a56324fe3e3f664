//! order-service 错误类型定义

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use easybuy_shared::SharedError;
use easybuy_shared::error::MSG_INTERNAL;
use easybuy_shared::response::{FieldError, error_response, field_errors};
use serde_json::json;

use crate::models::{OrderStatus, VoucherRejection};

/// order-service 错误类型
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error(transparent)]
    Shared(#[from] SharedError),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Address not found: {0}")]
    AddressNotFound(i64),
    #[error("Order not found: {0}")]
    OrderNotFound(i64),
    #[error("Voucher not found: {0}")]
    VoucherNotFound(String),
    #[error("Voucher not found: {0}")]
    VoucherIdNotFound(i64),

    #[error("Your cart is empty")]
    EmptyCart,
    #[error("Your cart changed during checkout, please try again")]
    CartChanged,
    #[error("Voucher cannot be applied: {0}")]
    VoucherNotApplicable(#[from] VoucherRejection),
    #[error("Voucher code already exists")]
    VoucherCodeExists,
    #[error("Product is no longer available: {0}")]
    ProductUnavailable(String),
    #[error("Not enough stock for {product_name}")]
    InsufficientStock {
        product_id: i64,
        product_name: String,
        available: i32,
    },
    #[error("Cannot change order status from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OrderError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Shared(e) => e.status_code(),

            Self::Validation(_) | Self::EmptyCart | Self::VoucherNotApplicable(_) => {
                StatusCode::BAD_REQUEST
            }

            Self::AddressNotFound(_)
            | Self::OrderNotFound(_)
            | Self::VoucherNotFound(_)
            | Self::VoucherIdNotFound(_) => StatusCode::NOT_FOUND,

            Self::VoucherCodeExists
            | Self::CartChanged
            | Self::ProductUnavailable(_)
            | Self::InsufficientStock { .. }
            | Self::InvalidStatusTransition { .. } => StatusCode::CONFLICT,

            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Shared(e) => e.code(),
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::AddressNotFound(_) => "ADDRESS_NOT_FOUND",
            Self::OrderNotFound(_) => "ORDER_NOT_FOUND",
            Self::VoucherNotFound(_) | Self::VoucherIdNotFound(_) => "VOUCHER_NOT_FOUND",
            Self::EmptyCart => "EMPTY_CART",
            Self::CartChanged => "CART_CHANGED",
            Self::VoucherNotApplicable(_) => "VOUCHER_NOT_APPLICABLE",
            Self::VoucherCodeExists => "VOUCHER_CODE_EXISTS",
            Self::ProductUnavailable(_) => "PRODUCT_UNAVAILABLE",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 单字段校验失败的快捷构造
    pub fn field(field: &str, message: &str) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        let (message, data) = match self {
            Self::Shared(e) => (e.public_message(), None),
            Self::Validation(errors) => (
                "Validation failed".to_string(),
                Some(json!({ "errors": errors })),
            ),
            Self::VoucherNotApplicable(reason) => (
                format!("Voucher cannot be applied: {}", reason),
                Some(json!({ "reason": reason.to_string() })),
            ),
            Self::InsufficientStock {
                product_id,
                product_name,
                available,
            } => (
                format!(
                    "Only {} item(s) of {} left in stock",
                    available, product_name
                ),
                Some(json!({ "productId": product_id, "available": available })),
            ),
            Self::InvalidStatusTransition { from, to } => (
                format!("Cannot change order status from {} to {}", from, to),
                Some(json!({
                    "from": from,
                    "to": to,
                    "allowed": from.next_statuses(),
                })),
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

impl From<validator::ValidationErrors> for OrderError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(field_errors(&errors))
    }
}

pub type Result<T> = std::result::Result<T, OrderError>;
