//! 订单服务
//!
//! ## 下单流程
//!
//! 1. 校验地址归属 -> 2. 锁定购物车商品并校验库存 -> 3. 锁定并校验优惠券
//!    -> 4. 计算金额 -> 5. 写订单与明细、扣库存、记优惠券用量、清空购物车、写通知
//!
//! 全部写入在同一事务内完成；任一步失败整体回滚。

use std::sync::Arc;

use chrono::Utc;
use easybuy_shared::observability::metrics;
use easybuy_shared::{PageResponse, PaginationParams};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};

use crate::dto::{OrderDetailDto, OrderSummaryDto, PlaceOrderRequest};
use crate::error::{OrderError, Result};
use crate::models::{OrderStatus, OrderTotals, ShippingPolicy, checkout_subtotal};
use crate::repository::{NewOrder, OrderRecord, OrderRepository, VoucherRepository};

/// 订单服务
pub struct OrderService {
    order_repo: Arc<OrderRepository>,
    pool: PgPool,
    shipping: ShippingPolicy,
}

impl OrderService {
    pub fn new(order_repo: Arc<OrderRepository>, pool: PgPool, shipping: ShippingPolicy) -> Self {
        Self {
            order_repo,
            pool,
            shipping,
        }
    }

    /// 按购物车下单
    #[instrument(skip(self, req), fields(address_id = req.address_id))]
    pub async fn place_order(&self, user_id: i64, req: &PlaceOrderRequest) -> Result<OrderDetailDto> {
        let voucher_code = req
            .voucher_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        let note = req.note.as_deref().map(str::trim).filter(|n| !n.is_empty());

        let mut tx = self.pool.begin().await?;

        let address = OrderRepository::find_address_in_tx(&mut tx, user_id, req.address_id)
            .await?
            .ok_or(OrderError::AddressNotFound(req.address_id))?;

        let lines = OrderRepository::lock_cart_lines_in_tx(&mut tx, user_id).await?;
        let subtotal = checkout_subtotal(&lines)?;

        let (voucher_id, discount) = match voucher_code {
            Some(code) => {
                let voucher = VoucherRepository::lock_by_code_in_tx(&mut tx, code)
                    .await?
                    .ok_or_else(|| OrderError::VoucherNotFound(code.to_string()))?;
                let discount = voucher.apply(subtotal, Utc::now())?;
                (Some(voucher.id), discount)
            }
            None => (None, Decimal::ZERO),
        };

        let totals = OrderTotals::compute(subtotal, discount, &self.shipping);
        let shipping_address = address.to_text();

        let order_id = OrderRepository::create_order_in_tx(
            &mut tx,
            &NewOrder {
                user_id,
                totals,
                voucher_id,
                payment_method: req.payment_method,
                shipping_address: &shipping_address,
                note,
            },
        )
        .await?;

        for line in &lines {
            OrderRepository::create_item_in_tx(&mut tx, order_id, line).await?;
        }

        if let Some(id) = voucher_id {
            VoucherRepository::adjust_usage_in_tx(&mut tx, id, 1).await?;
        }

        let cleared = OrderRepository::clear_cart_in_tx(&mut tx, user_id).await?;
        if cleared != lines.len() as u64 {
            // 锁定之后又有新商品加入购物车
            return Err(OrderError::CartChanged);
        }

        OrderRepository::notify_in_tx(
            &mut tx,
            user_id,
            "Order placed",
            &format!(
                "Your order #{} has been placed. Total: {}",
                order_id, totals.total
            ),
        )
        .await?;

        tx.commit().await?;

        metrics::record_order_placed(voucher_id.is_some());
        info!(
            user_id,
            order_id,
            items = lines.len(),
            total = %totals.total,
            voucher = voucher_code.unwrap_or("-"),
            "Order placed"
        );

        self.get_order(order_id, Some(user_id)).await
    }

    /// 订单详情；`user_id` 为空时不校验归属（管理员）
    pub async fn get_order(&self, id: i64, user_id: Option<i64>) -> Result<OrderDetailDto> {
        self.order_repo
            .get_detail(id, user_id)
            .await?
            .ok_or(OrderError::OrderNotFound(id))
    }

    pub async fn list_orders(
        &self,
        user_id: Option<i64>,
        status: Option<OrderStatus>,
        params: &PaginationParams,
    ) -> Result<PageResponse<OrderSummaryDto>> {
        let (items, total) = self
            .order_repo
            .list(user_id, status, params.limit(), params.offset())
            .await?;

        if total == 0 {
            return Ok(PageResponse::empty(params.page(), params.limit()));
        }
        Ok(PageResponse::new(items, total, params.page(), params.limit()))
    }

    /// 顾客取消自己的订单，只允许 pending/confirmed
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, user_id: i64, id: i64) -> Result<OrderDetailDto> {
        let mut tx = self.pool.begin().await?;

        let order = OrderRepository::lock_order_in_tx(&mut tx, id, Some(user_id))
            .await?
            .ok_or(OrderError::OrderNotFound(id))?;
        self.transition_in_tx(&mut tx, &order, OrderStatus::Cancelled)
            .await?;

        tx.commit().await?;

        info!(user_id, order_id = id, from = %order.status, "Order cancelled by customer");

        self.get_order(id, Some(user_id)).await
    }

    /// 管理员修改订单状态
    #[instrument(skip(self))]
    pub async fn update_status(&self, admin_id: i64, id: i64, status: OrderStatus) -> Result<OrderDetailDto> {
        let mut tx = self.pool.begin().await?;

        let order = OrderRepository::lock_order_in_tx(&mut tx, id, None)
            .await?
            .ok_or(OrderError::OrderNotFound(id))?;
        self.transition_in_tx(&mut tx, &order, status).await?;

        tx.commit().await?;

        info!(admin_id, order_id = id, from = %order.status, to = %status, "Order status updated");

        self.get_order(id, None).await
    }

    /// 在事务中执行状态流转
    ///
    /// 转为 cancelled 时回补库存并退回优惠券用量
    async fn transition_in_tx(
        &self,
        tx: &mut PgConnection,
        order: &OrderRecord,
        to: OrderStatus,
    ) -> Result<()> {
        if !order.status.can_transition_to(to) {
            return Err(OrderError::InvalidStatusTransition {
                from: order.status,
                to,
            });
        }

        if to == OrderStatus::Cancelled {
            OrderRepository::restore_stock_in_tx(tx, order.id).await?;
            if let Some(voucher_id) = order.voucher_id {
                VoucherRepository::adjust_usage_in_tx(tx, voucher_id, -1).await?;
            }
        }

        OrderRepository::update_status_in_tx(tx, order.id, to).await?;

        OrderRepository::notify_in_tx(
            tx,
            order.user_id,
            status_title(to),
            &format!("Your order #{} is now {}", order.id, to),
        )
        .await?;

        Ok(())
    }
}

fn status_title(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "Order pending",
        OrderStatus::Confirmed => "Order confirmed",
        OrderStatus::Shipping => "Order shipped",
        OrderStatus::Delivered => "Order delivered",
        OrderStatus::Cancelled => "Order cancelled",
    }
}
