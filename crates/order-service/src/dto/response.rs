//! 响应 DTO 定义

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{DiscountType, OrderStatus, PaymentMethod, Voucher};

/// 订单列表条目
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummaryDto {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub subtotal: Decimal,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub discount: Decimal,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub shipping_fee: Decimal,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

/// 订单明细行
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    /// 商品被删除后为空，名称和单价仍保留下单时的快照
    pub product_id: Option<i64>,
    pub product_name: String,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub unit_price: Decimal,
    pub quantity: i32,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub line_total: Decimal,
}

/// 订单详情
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailDto {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub subtotal: Decimal,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub discount: Decimal,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub shipping_fee: Decimal,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub total: Decimal,
    pub voucher_code: Option<String>,
    pub payment_method: PaymentMethod,
    pub shipping_address: String,
    pub note: Option<String>,
    pub items: Vec<OrderItemDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 面向顾客的优惠券信息
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherDto {
    pub id: i64,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub discount_value: Decimal,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub min_order_value: Decimal,
    #[serde(serialize_with = "easybuy_shared::money::serialize_option")]
    pub max_discount: Option<Decimal>,
    /// 剩余可用次数，不限次数时为空
    pub remaining_uses: Option<i32>,
    pub starts_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<Voucher> for VoucherDto {
    fn from(v: Voucher) -> Self {
        Self {
            remaining_uses: v.usage_limit.map(|limit| (limit - v.used_count).max(0)),
            id: v.id,
            code: v.code,
            description: v.description,
            discount_type: v.discount_type,
            discount_value: v.discount_value,
            min_order_value: v.min_order_value,
            max_discount: v.max_discount,
            starts_at: v.starts_at,
            expires_at: v.expires_at,
        }
    }
}

/// 优惠券试算结果
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherPreviewDto {
    pub code: String,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub subtotal: Decimal,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub discount: Decimal,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub shipping_fee: Decimal,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub total: Decimal,
}
