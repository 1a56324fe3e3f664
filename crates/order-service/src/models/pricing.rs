//! 订单金额计算

use std::str::FromStr;

use easybuy_shared::config::OrderSettings;
use rust_decimal::Decimal;
use serde::Serialize;

/// 运费规则：固定运费，小计达到阈值免运费
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    pub fee: Decimal,
    pub free_threshold: Decimal,
}

impl ShippingPolicy {
    pub fn from_settings(settings: &OrderSettings) -> Result<Self, rust_decimal::Error> {
        Ok(Self {
            fee: Decimal::from_str(&settings.shipping_fee)?,
            free_threshold: Decimal::from_str(&settings.free_shipping_threshold)?,
        })
    }

    /// 免运费按折扣前的小计判断
    pub fn fee_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal >= self.free_threshold {
            Decimal::ZERO
        } else {
            self.fee
        }
    }
}

/// 订单金额汇总
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub subtotal: Decimal,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub discount: Decimal,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub shipping_fee: Decimal,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub total: Decimal,
}

impl OrderTotals {
    pub fn compute(subtotal: Decimal, discount: Decimal, shipping: &ShippingPolicy) -> Self {
        let discount = discount.min(subtotal);
        let shipping_fee = shipping.fee_for(subtotal);
        Self {
            subtotal,
            discount,
            shipping_fee,
            total: subtotal - discount + shipping_fee,
        }
    }
}
