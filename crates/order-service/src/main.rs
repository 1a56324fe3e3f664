//! EasyBuy 订单服务入口

use std::sync::Arc;

use easybuy_shared::{
    cache::Cache, config::AppConfig, database::Database, observability, server::shutdown_signal,
};
use easybuy_order_service::{routes, state::AppState};
use tokio::net::TcpListener;
use tracing::info;

const SERVICE_NAME: &str = "order-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME)?;

    let _guard = observability::init(&config.service_name, &config.observability).await?;

    info!(
        environment = %config.environment,
        "Starting {} on {}",
        SERVICE_NAME,
        config.server_addr()
    );

    let db = Database::connect(&config.database).await?;
    let cache = Arc::new(Cache::new(&config.redis)?);

    let state = AppState::new(db.pool().clone(), cache, &config)?;
    info!(
        shipping_fee = %config.order.shipping_fee,
        free_shipping_threshold = %config.order.free_shipping_threshold,
        "Shipping policy loaded"
    );

    let app = routes::app(state, &config.server);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}
