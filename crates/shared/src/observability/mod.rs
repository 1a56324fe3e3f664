//! 日志与指标初始化
//!
//! 各服务在 `main` 中调用 [`init`]，返回的 guard 需持有到进程退出

pub mod metrics;
pub mod middleware;
pub mod tracing;

use ::tracing::info;
use anyhow::Result;

use crate::config::ObservabilityConfig;

/// 持有指标导出任务
pub struct ObservabilityGuard {
    _metrics: Option<metrics::MetricsHandle>,
}

impl ObservabilityGuard {
    /// 不带指标导出的 guard
    pub fn empty() -> Self {
        Self { _metrics: None }
    }
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        info!("Observability shut down");
    }
}

/// 先初始化日志，`metrics_enabled` 时再启动指标导出
///
/// ```ignore
/// let config = AppConfig::load("user-service")?;
/// let _guard = observability::init(&config.service_name, &config.observability).await?;
/// ```
pub async fn init(service_name: &str, config: &ObservabilityConfig) -> Result<ObservabilityGuard> {
    tracing::init(config)?;

    info!(
        service = %service_name,
        log_format = %config.log_format,
        metrics_enabled = config.metrics_enabled,
        "Observability initialized"
    );

    let metrics = if config.metrics_enabled {
        Some(metrics::init(service_name, config.metrics_port).await?)
    } else {
        None
    };

    Ok(ObservabilityGuard { _metrics: metrics })
}
