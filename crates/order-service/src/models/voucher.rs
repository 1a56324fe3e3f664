//! 优惠券模型与折扣计算

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 折扣类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum DiscountType {
    /// 按小计百分比，可设上限
    Percentage,
    /// 固定金额
    Fixed,
}

/// 优惠券
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
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
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub starts_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// 优惠券不可用的原因
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoucherRejection {
    #[error("Voucher is not active")]
    Inactive,
    #[error("Voucher is not valid yet")]
    NotStarted,
    #[error("Voucher has expired")]
    Expired,
    #[error("Voucher usage limit has been reached")]
    UsageLimitReached,
    #[error("Order subtotal must be at least {0}")]
    BelowMinimum(Decimal),
}

impl Voucher {
    /// 检查优惠券对给定小计是否可用
    ///
    /// 有效期为闭区间 `[starts_at, expires_at]`
    pub fn check(&self, subtotal: Decimal, now: DateTime<Utc>) -> Result<(), VoucherRejection> {
        if !self.is_active {
            return Err(VoucherRejection::Inactive);
        }
        if now < self.starts_at {
            return Err(VoucherRejection::NotStarted);
        }
        if now > self.expires_at {
            return Err(VoucherRejection::Expired);
        }
        if self
            .usage_limit
            .is_some_and(|limit| self.used_count >= limit)
        {
            return Err(VoucherRejection::UsageLimitReached);
        }
        if subtotal < self.min_order_value {
            return Err(VoucherRejection::BelowMinimum(self.min_order_value));
        }
        Ok(())
    }

    /// 计算折扣金额，不超过小计
    pub fn discount_for(&self, subtotal: Decimal) -> Decimal {
        let raw = match self.discount_type {
            DiscountType::Percentage => {
                let amount = (subtotal * self.discount_value / Decimal::ONE_HUNDRED).round_dp(2);
                match self.max_discount {
                    Some(cap) => amount.min(cap),
                    None => amount,
                }
            }
            DiscountType::Fixed => self.discount_value,
        };
        raw.min(subtotal).max(Decimal::ZERO)
    }

    /// 检查可用性并返回折扣金额
    pub fn apply(&self, subtotal: Decimal, now: DateTime<Utc>) -> Result<Decimal, VoucherRejection> {
        self.check(subtotal, now)?;
        Ok(self.discount_for(subtotal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn voucher(discount_type: DiscountType, value: &str) -> Voucher {
        let now = Utc::now();
        Voucher {
            id: 1,
            code: "SAVE".to_string(),
            description: None,
            discount_type,
            discount_value: dec(value),
            min_order_value: Decimal::ZERO,
            max_discount: None,
            usage_limit: None,
            used_count: 0,
            starts_at: now - Duration::days(1),
            expires_at: now + Duration::days(1),
            is_active: true,
            created_at: now,
        }
    }

    #[test]
    fn test_percentage_discount() {
        let v = voucher(DiscountType::Percentage, "10");
        assert_eq!(v.discount_for(dec("250000")), dec("25000"));
    }

    #[test]
    fn test_percentage_discount_capped() {
        let mut v = voucher(DiscountType::Percentage, "20");
        v.max_discount = Some(dec("50000"));
        assert_eq!(v.discount_for(dec("1000000")), dec("50000"));
        assert_eq!(v.discount_for(dec("100000")), dec("20000"));
    }

    #[test]
    fn test_fixed_discount_never_exceeds_subtotal() {
        let v = voucher(DiscountType::Fixed, "100000");
        assert_eq!(v.discount_for(dec("300000")), dec("100000"));
        assert_eq!(v.discount_for(dec("40000")), dec("40000"));
    }

    #[test]
    fn test_percentage_rounds_to_cents() {
        let v = voucher(DiscountType::Percentage, "15");
        assert_eq!(v.discount_for(dec("33.33")), dec("5.00"));
    }

    #[test]
    fn test_rejections() {
        let now = Utc::now();

        let mut v = voucher(DiscountType::Fixed, "10");
        v.is_active = false;
        assert_eq!(v.check(dec("100"), now), Err(VoucherRejection::Inactive));

        let mut v = voucher(DiscountType::Fixed, "10");
        v.starts_at = now + Duration::hours(1);
        assert_eq!(v.check(dec("100"), now), Err(VoucherRejection::NotStarted));

        let mut v = voucher(DiscountType::Fixed, "10");
        v.expires_at = now - Duration::seconds(1);
        assert_eq!(v.check(dec("100"), now), Err(VoucherRejection::Expired));

        let mut v = voucher(DiscountType::Fixed, "10");
        v.usage_limit = Some(5);
        v.used_count = 5;
        assert_eq!(
            v.check(dec("100"), now),
            Err(VoucherRejection::UsageLimitReached)
        );

        let mut v = voucher(DiscountType::Fixed, "10");
        v.min_order_value = dec("200000");
        assert_eq!(
            v.apply(dec("199999.99"), now),
            Err(VoucherRejection::BelowMinimum(dec("200000")))
        );
        assert_eq!(v.apply(dec("200000"), now), Ok(dec("10")));
    }

    #[test]
    fn test_validity_window_is_inclusive() {
        let v = voucher(DiscountType::Fixed, "10");
        assert!(v.check(dec("1"), v.starts_at).is_ok());
        assert!(v.check(dec("1"), v.expires_at).is_ok());
    }
}
