//! 订单仓储
//!
//! 订单、订单明细，以及下单/取消时联动的购物车、库存和站内通知

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::dto::{OrderDetailDto, OrderItemDto, OrderSummaryDto};
use crate::error::Result;
use crate::models::{AddressSnapshot, CartLine, OrderStatus, OrderTotals, PaymentMethod};

const SUMMARY_COLUMNS: &str = "o.id, o.user_id, o.status, o.subtotal, o.discount, o.shipping_fee, \
                               o.total, o.payment_method, \
                               (SELECT COALESCE(SUM(i.quantity), 0)::BIGINT FROM order_items i WHERE i.order_id = o.id) AS item_count, \
                               o.created_at";

/// 待写入的订单头
#[derive(Debug)]
pub struct NewOrder<'a> {
    pub user_id: i64,
    pub totals: OrderTotals,
    pub voucher_id: Option<i64>,
    pub payment_method: PaymentMethod,
    pub shipping_address: &'a str,
    pub note: Option<&'a str>,
}

/// 加锁读取的订单头，用于状态流转
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRecord {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    pub voucher_id: Option<i64>,
}

#[derive(sqlx::FromRow)]
struct OrderHeaderRow {
    id: i64,
    user_id: i64,
    status: OrderStatus,
    subtotal: Decimal,
    discount: Decimal,
    shipping_fee: Decimal,
    total: Decimal,
    voucher_code: Option<String>,
    payment_method: PaymentMethod,
    shipping_address: String,
    note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// 订单仓储
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 查询 ====================

    /// 订单详情；传入 `user_id` 时只返回该用户自己的订单
    pub async fn get_detail(&self, id: i64, user_id: Option<i64>) -> Result<Option<OrderDetailDto>> {
        let header = sqlx::query_as::<_, OrderHeaderRow>(
            r#"
            SELECT o.id, o.user_id, o.status, o.subtotal, o.discount, o.shipping_fee, o.total,
                   v.code AS voucher_code, o.payment_method, o.shipping_address, o.note,
                   o.created_at, o.updated_at
            FROM orders o
            LEFT JOIN vouchers v ON v.id = o.voucher_id
            WHERE o.id = $1 AND ($2::bigint IS NULL OR o.user_id = $2)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(h) = header else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemDto>(
            r#"
            SELECT product_id, product_name, unit_price, quantity,
                   unit_price * quantity AS line_total
            FROM order_items
            WHERE order_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(OrderDetailDto {
            id: h.id,
            user_id: h.user_id,
            status: h.status,
            subtotal: h.subtotal,
            discount: h.discount,
            shipping_fee: h.shipping_fee,
            total: h.total,
            voucher_code: h.voucher_code,
            payment_method: h.payment_method,
            shipping_address: h.shipping_address,
            note: h.note,
            items,
            created_at: h.created_at,
            updated_at: h.updated_at,
        }))
    }

    /// 分页列出订单，返回 (当前页, 总数)
    ///
    /// `user_id` 为空时列出所有用户的订单（管理员）
    pub async fn list(
        &self,
        user_id: Option<i64>,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<OrderSummaryDto>, i64)> {
        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM orders
            WHERE ($1::bigint IS NULL OR user_id = $1)
              AND ($2::varchar IS NULL OR status = $2)
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        if total == 0 {
            return Ok((Vec::new(), 0));
        }

        let orders = sqlx::query_as::<_, OrderSummaryDto>(&format!(
            r#"
            SELECT {SUMMARY_COLUMNS}
            FROM orders o
            WHERE ($1::bigint IS NULL OR o.user_id = $1)
              AND ($2::varchar IS NULL OR o.status = $2)
            ORDER BY o.created_at DESC, o.id DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(user_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((orders, total))
    }

    // ==================== 下单事务 ====================

    /// 在事务中读取用户自己的收货地址
    pub async fn find_address_in_tx(
        tx: &mut PgConnection,
        user_id: i64,
        address_id: i64,
    ) -> Result<Option<AddressSnapshot>> {
        let address = sqlx::query_as::<_, AddressSnapshot>(
            r#"
            SELECT recipient_name, phone, address_line, ward, district, city
            FROM user_addresses
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(address_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        Ok(address)
    }

    /// 在事务中锁定购物车行及其商品行
    ///
    /// 按商品 id 顺序加锁，并发下单不会互相死锁。同一用户并发下单时，
    /// 后到的事务等待前者提交，已被清空的购物车行不再返回
    pub async fn lock_cart_lines_in_tx(tx: &mut PgConnection, user_id: i64) -> Result<Vec<CartLine>> {
        let lines = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT p.id AS product_id, p.name AS product_name, p.price AS unit_price,
                   p.stock, p.is_active, c.quantity
            FROM cart_items c
            JOIN products p ON p.id = c.product_id
            WHERE c.user_id = $1
            ORDER BY p.id ASC
            FOR UPDATE OF c, p
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        Ok(lines)
    }

    /// 在事务中创建订单头
    pub async fn create_order_in_tx(tx: &mut PgConnection, order: &NewOrder<'_>) -> Result<i64> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO orders (user_id, status, subtotal, discount, shipping_fee, total,
                                voucher_id, payment_method, shipping_address, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(order.user_id)
        .bind(OrderStatus::Pending)
        .bind(order.totals.subtotal)
        .bind(order.totals.discount)
        .bind(order.totals.shipping_fee)
        .bind(order.totals.total)
        .bind(order.voucher_id)
        .bind(order.payment_method)
        .bind(order.shipping_address)
        .bind(order.note)
        .fetch_one(&mut *tx)
        .await?;

        Ok(id)
    }

    /// 在事务中写入订单明细并扣减库存
    pub async fn create_item_in_tx(tx: &mut PgConnection, order_id: i64, line: &CartLine) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_id, product_name, unit_price, quantity)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(order_id)
        .bind(line.product_id)
        .bind(&line.product_name)
        .bind(line.unit_price)
        .bind(line.quantity)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE products SET stock = stock - $2, updated_at = NOW() WHERE id = $1")
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;

        Ok(())
    }

    /// 在事务中清空购物车
    pub async fn clear_cart_in_tx(tx: &mut PgConnection, user_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        Ok(result.rows_affected())
    }

    // ==================== 状态流转 ====================

    /// 在事务中锁定订单；传入 `user_id` 时只锁定该用户的订单
    pub async fn lock_order_in_tx(
        tx: &mut PgConnection,
        id: i64,
        user_id: Option<i64>,
    ) -> Result<Option<OrderRecord>> {
        let order = sqlx::query_as::<_, OrderRecord>(
            r#"
            SELECT id, user_id, status, voucher_id
            FROM orders
            WHERE id = $1 AND ($2::bigint IS NULL OR user_id = $2)
            FOR UPDATE
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        Ok(order)
    }

    pub async fn update_status_in_tx(tx: &mut PgConnection, id: i64, status: OrderStatus) -> Result<()> {
        sqlx::query("UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut *tx)
            .await?;

        Ok(())
    }

    /// 在事务中把订单明细的数量加回商品库存
    ///
    /// 已删除的商品（product_id 为空）跳过
    pub async fn restore_stock_in_tx(tx: &mut PgConnection, order_id: i64) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE products p
            SET stock = p.stock + i.quantity, updated_at = NOW()
            FROM (
                SELECT product_id, SUM(quantity)::INTEGER AS quantity
                FROM order_items
                WHERE order_id = $1 AND product_id IS NOT NULL
                GROUP BY product_id
            ) i
            WHERE p.id = i.product_id
            "#,
        )
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        Ok(result.rows_affected())
    }

    /// 在事务中写入一条订单类站内通知
    pub async fn notify_in_tx(
        tx: &mut PgConnection,
        user_id: i64,
        title: &str,
        message: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (user_id, title, message, type)
            VALUES ($1, $2, $3, 'order')
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(message)
        .execute(&mut *tx)
        .await?;

        Ok(())
    }
}
