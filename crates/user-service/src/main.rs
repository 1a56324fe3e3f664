//! EasyBuy 用户服务入口

use std::sync::Arc;

use easybuy_shared::{
    cache::Cache, config::AppConfig, database::Database, observability, server::shutdown_signal,
};
use easybuy_user_service::{routes, state::AppState, worker::TokenCleanupWorker};
use tokio::net::TcpListener;
use tracing::info;

const SERVICE_NAME: &str = "user-service";

/// 验证码清理间隔（秒）
const TOKEN_CLEANUP_INTERVAL_SECS: u64 = 3600;

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

    let state = AppState::new(db.pool().clone(), cache, &config);

    let cleanup_pool = db.pool().clone();
    let retention_hours = config.auth.otp_retention_hours;
    tokio::spawn(async move {
        let worker =
            TokenCleanupWorker::new(cleanup_pool, TOKEN_CLEANUP_INTERVAL_SECS, retention_hours);
        worker.run().await;
    });

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
