//! 请求 DTO 定义

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::error::OrderError;
use crate::models::{DiscountType, OrderStatus, PaymentMethod};

fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value > Decimal::ZERO {
        Ok(())
    } else {
        let mut err = ValidationError::new("range");
        err.message = Some("must be greater than 0".into());
        Err(err)
    }
}

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("must not be negative".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// 规范化优惠码：去空白并转大写
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

// ==================== 订单 ====================

/// 下单请求，商品来自当前购物车
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[validate(range(min = 1, message = "address is required"))]
    pub address_id: i64,
    #[validate(length(min = 1, max = 50, message = "voucher code must be 1-50 characters"))]
    pub voucher_code: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[validate(length(max = 500, message = "note must be at most 500 characters"))]
    pub note: Option<String>,
}

/// 订单列表过滤
#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
}

/// 管理员修改订单状态
#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

// ==================== 优惠券 ====================

/// 优惠券试算
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ValidateVoucherRequest {
    #[validate(length(min = 1, max = 50, message = "voucher code must be 1-50 characters"))]
    pub code: String,
    #[validate(custom(function = "validate_non_negative"))]
    pub subtotal: Decimal,
}

/// 创建优惠券
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVoucherRequest {
    #[validate(length(min = 3, max = 50, message = "code must be 3-50 characters"))]
    pub code: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    #[validate(custom(function = "validate_positive"))]
    pub discount_value: Decimal,
    #[validate(custom(function = "validate_non_negative"))]
    pub min_order_value: Option<Decimal>,
    #[validate(custom(function = "validate_positive"))]
    pub max_discount: Option<Decimal>,
    #[validate(range(min = 1, message = "usage limit must be at least 1"))]
    pub usage_limit: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub is_active: Option<bool>,
}

impl CreateVoucherRequest {
    /// 跨字段规则：百分比不超过 100，结束时间晚于开始时间
    pub fn check_rules(&self, now: DateTime<Utc>) -> Result<(), OrderError> {
        check_percentage(self.discount_type, self.discount_value)?;
        check_window(self.starts_at.unwrap_or(now), self.expires_at)
    }
}

/// 更新优惠券，未提供的字段保持不变
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVoucherRequest {
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    #[validate(custom(function = "validate_positive"))]
    pub discount_value: Option<Decimal>,
    #[validate(custom(function = "validate_non_negative"))]
    pub min_order_value: Option<Decimal>,
    #[validate(custom(function = "validate_positive"))]
    pub max_discount: Option<Decimal>,
    #[validate(range(min = 1, message = "usage limit must be at least 1"))]
    pub usage_limit: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

pub(crate) fn check_percentage(kind: DiscountType, value: Decimal) -> Result<(), OrderError> {
    if kind == DiscountType::Percentage && value > Decimal::ONE_HUNDRED {
        return Err(OrderError::field(
            "discount_value",
            "percentage discount must not exceed 100",
        ));
    }
    Ok(())
}

pub(crate) fn check_window(
    starts_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> Result<(), OrderError> {
    if expires_at <= starts_at {
        return Err(OrderError::field(
            "expires_at",
            "expiry must be later than start time",
        ));
    }
    Ok(())
}
