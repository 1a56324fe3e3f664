//! Prometheus 指标
//!
//! 请求、验证码、下单和后台任务的计数器，由单独端口的 `/metrics` 导出

use std::net::SocketAddr;

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::{net::TcpListener, task::JoinHandle};
use tracing::{error, info};

/// 指标导出服务的任务句柄
pub struct MetricsHandle {
    _exporter: JoinHandle<()>,
}

/// 安装全局 recorder 并在 `port` 上启动导出服务
pub async fn init(service_name: &str, port: u16) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);

    let exporter = serve_exporter(SocketAddr::from(([0, 0, 0, 0], port)), handle).await?;
    Ok(MetricsHandle {
        _exporter: exporter,
    })
}

fn describe_metrics() {
    metrics::describe_counter!("http_requests_total", "HTTP requests by method, path and status");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request latency in seconds"
    );
    metrics::describe_counter!("otp_issued_total", "One-time codes issued");
    metrics::describe_counter!("otp_consumed_total", "One-time code consumption attempts");
    metrics::describe_counter!("orders_placed_total", "Orders placed");
    metrics::describe_gauge!(
        "worker_last_run_timestamp",
        "Unix timestamp of the last background worker run"
    );
}

async fn serve_exporter(addr: SocketAddr, handle: PrometheusHandle) -> Result<JoinHandle<()>> {
    let app = Router::new().route("/metrics", get(move || std::future::ready(handle.render())));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Metrics exporter listening");

    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "Metrics exporter stopped");
        }
    }))
}

/// 记录 HTTP 请求
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str
    )
    .record(duration_secs);
}

/// 记录验证码签发
#[inline]
pub fn record_otp_issued(purpose: &str) {
    metrics::counter!("otp_issued_total", "purpose" => purpose.to_string()).increment(1);
}

/// 记录验证码消费结果（consumed / invalid / already_used / expired）
#[inline]
pub fn record_otp_consumed(purpose: &str, outcome: &str) {
    metrics::counter!(
        "otp_consumed_total",
        "purpose" => purpose.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// 记录下单
#[inline]
pub fn record_order_placed(with_voucher: bool) {
    metrics::counter!("orders_placed_total", "with_voucher" => with_voucher.to_string())
        .increment(1);
}

/// 记录后台任务最近一次运行时间
#[inline]
pub fn set_worker_last_run(worker: &str) {
    metrics::gauge!("worker_last_run_timestamp", "worker" => worker.to_string())
        .set(chrono::Utc::now().timestamp() as f64);
}
