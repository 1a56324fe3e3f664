//! 应用状态定义

use std::sync::Arc;

use easybuy_shared::auth::JwtManager;
use easybuy_shared::cache::Cache;
use easybuy_shared::config::AppConfig;
use sqlx::PgPool;

use crate::models::ShippingPolicy;
use crate::repository::{OrderRepository, VoucherRepository};
use crate::service::{OrderService, VoucherService};

/// Axum 应用共享状态
///
/// 在 main 中显式构造，通过 `State` 注入 handler
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Redis 客户端，就绪探针使用
    pub cache: Arc<Cache>,
    pub jwt: JwtManager,
    pub orders: Arc<OrderService>,
    pub vouchers: Arc<VoucherService>,
}

impl AppState {
    /// 按配置创建应用状态
    ///
    /// 运费配置不是合法金额时返回错误
    pub fn new(pool: PgPool, cache: Arc<Cache>, config: &AppConfig) -> Result<Self, rust_decimal::Error> {
        let shipping = ShippingPolicy::from_settings(&config.order)?;

        let order_repo = Arc::new(OrderRepository::new(pool.clone()));
        let voucher_repo = Arc::new(VoucherRepository::new(pool.clone()));

        Ok(Self {
            orders: Arc::new(OrderService::new(order_repo, pool.clone(), shipping)),
            vouchers: Arc::new(VoucherService::new(voucher_repo, shipping)),
            jwt: JwtManager::new(config.jwt.clone()),
            pool,
            cache,
        })
    }
}
