//! 优惠券仓储

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crate::dto::{CreateVoucherRequest, UpdateVoucherRequest};
use crate::error::Result;
use crate::models::Voucher;

const VOUCHER_COLUMNS: &str = "id, code, description, discount_type, discount_value, min_order_value, \
                               max_discount, usage_limit, used_count, starts_at, expires_at, \
                               is_active, created_at";

/// 优惠券仓储
pub struct VoucherRepository {
    pool: PgPool,
}

impl VoucherRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: i64) -> Result<Option<Voucher>> {
        let voucher = sqlx::query_as::<_, Voucher>(&format!(
            "SELECT {VOUCHER_COLUMNS} FROM vouchers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(voucher)
    }

    /// 按优惠码查找（不区分大小写）
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Voucher>> {
        let voucher = sqlx::query_as::<_, Voucher>(&format!(
            "SELECT {VOUCHER_COLUMNS} FROM vouchers WHERE UPPER(code) = UPPER($1)"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(voucher)
    }

    /// 当前可用的优惠券：已启用、在有效期内、未用完
    pub async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<Voucher>> {
        let vouchers = sqlx::query_as::<_, Voucher>(&format!(
            r#"
            SELECT {VOUCHER_COLUMNS}
            FROM vouchers
            WHERE is_active
              AND starts_at <= $1 AND expires_at >= $1
              AND (usage_limit IS NULL OR used_count < usage_limit)
            ORDER BY expires_at ASC, id ASC
            "#
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(vouchers)
    }

    pub async fn create(&self, req: &CreateVoucherRequest, code: &str, now: DateTime<Utc>) -> Result<Voucher> {
        let voucher = sqlx::query_as::<_, Voucher>(&format!(
            r#"
            INSERT INTO vouchers (code, description, discount_type, discount_value, min_order_value,
                                  max_discount, usage_limit, starts_at, expires_at, is_active)
            VALUES ($1, $2, $3, $4, COALESCE($5, 0), $6, $7, $8, $9, $10)
            RETURNING {VOUCHER_COLUMNS}
            "#
        ))
        .bind(code)
        .bind(&req.description)
        .bind(req.discount_type)
        .bind(req.discount_value)
        .bind(req.min_order_value)
        .bind(req.max_discount)
        .bind(req.usage_limit)
        .bind(req.starts_at.unwrap_or(now))
        .bind(req.expires_at)
        .bind(req.is_active.unwrap_or(true))
        .fetch_one(&self.pool)
        .await?;

        Ok(voucher)
    }

    /// 部分更新，未提供的字段保持原值
    pub async fn update(&self, id: i64, req: &UpdateVoucherRequest) -> Result<Option<Voucher>> {
        let voucher = sqlx::query_as::<_, Voucher>(&format!(
            r#"
            UPDATE vouchers
            SET description = COALESCE($2, description),
                discount_type = COALESCE($3, discount_type),
                discount_value = COALESCE($4, discount_value),
                min_order_value = COALESCE($5, min_order_value),
                max_discount = COALESCE($6, max_discount),
                usage_limit = COALESCE($7, usage_limit),
                starts_at = COALESCE($8, starts_at),
                expires_at = COALESCE($9, expires_at),
                is_active = COALESCE($10, is_active)
            WHERE id = $1
            RETURNING {VOUCHER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&req.description)
        .bind(req.discount_type)
        .bind(req.discount_value)
        .bind(req.min_order_value)
        .bind(req.max_discount)
        .bind(req.usage_limit)
        .bind(req.starts_at)
        .bind(req.expires_at)
        .bind(req.is_active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(voucher)
    }

    /// 删除优惠券；已使用过它的订单保留，voucher_id 置空
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM vouchers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 在事务中按优惠码锁定优惠券
    pub async fn lock_by_code_in_tx(tx: &mut PgConnection, code: &str) -> Result<Option<Voucher>> {
        let voucher = sqlx::query_as::<_, Voucher>(&format!(
            "SELECT {VOUCHER_COLUMNS} FROM vouchers WHERE UPPER(code) = UPPER($1) FOR UPDATE"
        ))
        .bind(code)
        .fetch_optional(&mut *tx)
        .await?;

        Ok(voucher)
    }

    /// 在事务中调整已使用次数，`delta` 为负时回退，不低于 0
    pub async fn adjust_usage_in_tx(tx: &mut PgConnection, id: i64, delta: i32) -> Result<()> {
        sqlx::query("UPDATE vouchers SET used_count = GREATEST(used_count + $2, 0) WHERE id = $1")
            .bind(id)
            .bind(delta)
            .execute(&mut *tx)
            .await?;

        Ok(())
    }
}
