//! 子进程监督
//!
//! 以子进程方式启动各服务，延迟探测健康检查。
//! 收到关闭信号或任一服务退出时，向其余子进程转发 SIGTERM，
//! 等待它们优雅退出，超过宽限期仍未退出的才强制结束。

use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;

use anyhow::{Context, Result};
use easybuy_shared::server::shutdown_signal;
use futures::future::{join_all, select_all};
use tokio::process::{Child, Command};
use tracing::{error, info, warn};

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);
/// 服务收到 SIGTERM 后完成请求排空和连接池关闭的时间
const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(15);

/// 被监督的服务
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    /// 配置名，同时用于加载 `config/{name}.toml`
    pub name: &'static str,
    pub binary: &'static str,
    pub port: u16,
}

impl ServiceSpec {
    pub fn health_url(&self) -> String {
        format!("http://127.0.0.1:{}/health", self.port)
    }
}

/// 服务二进制的路径
pub fn binary_path(bin_dir: &Path, binary: &str) -> PathBuf {
    let mut path = bin_dir.join(binary);
    if cfg!(windows) {
        path.set_extension("exe");
    }
    path
}

/// 默认二进制目录：当前可执行文件所在目录
pub fn default_bin_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("无法定位当前可执行文件")?;
    exe.parent()
        .map(Path::to_path_buf)
        .context("可执行文件没有父目录")
}

struct Running {
    spec: ServiceSpec,
    child: Child,
}

/// 子进程监督器
pub struct Supervisor {
    bin_dir: PathBuf,
    client: reqwest::Client,
    grace_period: Duration,
    running: Vec<Running>,
}

impl Supervisor {
    pub fn new(bin_dir: PathBuf) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .context("创建 HTTP 客户端失败")?;

        Ok(Self {
            bin_dir,
            client,
            grace_period: DEFAULT_GRACE_PERIOD,
            running: Vec::new(),
        })
    }

    /// 设置优雅退出的宽限期
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// 启动一个服务；失败时已启动的子进程随监督器一起被回收
    pub fn spawn(&mut self, spec: ServiceSpec) -> Result<()> {
        let path = binary_path(&self.bin_dir, spec.binary);
        let child = Command::new(&path)
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("启动 {} 失败: {}", spec.name, path.display()))?;

        info!(
            service = spec.name,
            pid = child.id(),
            port = spec.port,
            "Service process started"
        );
        self.running.push(Running { spec, child });
        Ok(())
    }

    /// 并发探测所有服务的 /health，只记录结果
    pub async fn probe_all(&self) {
        let probes = self.running.iter().map(|r| async move {
            let url = r.spec.health_url();
            match self.client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    info!(service = r.spec.name, %url, "Health check passed");
                }
                Ok(resp) => {
                    warn!(service = r.spec.name, %url, status = %resp.status(), "Health check failed");
                }
                Err(e) => {
                    warn!(service = r.spec.name, %url, error = %e, "Health check unreachable");
                }
            }
        });
        join_all(probes).await;
    }

    /// 等待关闭信号或任一子进程退出，然后停止其余子进程
    pub async fn wait(mut self) -> Result<()> {
        if self.running.is_empty() {
            return Ok(());
        }

        let exited: Option<(usize, std::io::Result<ExitStatus>)> = {
            let waits = self
                .running
                .iter_mut()
                .map(|r| Box::pin(r.child.wait()))
                .collect::<Vec<_>>();

            tokio::select! {
                _ = shutdown_signal() => None,
                (result, index, _) = select_all(waits) => Some((index, result)),
            }
        };

        if let Some((index, result)) = exited {
            let name = self.running[index].spec.name;
            match result {
                Ok(status) => error!(service = name, %status, "Service exited, stopping the rest"),
                Err(e) => error!(service = name, error = %e, "Failed to wait on service"),
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// 转发 SIGTERM 并在宽限期内等待退出，超时的子进程被强制结束
    async fn shutdown(&mut self) {
        for r in &mut self.running {
            terminate(r);
        }

        let grace = self.grace_period;
        let stops = self.running.iter_mut().map(|r| async move {
            match tokio::time::timeout(grace, r.child.wait()).await {
                Ok(Ok(status)) => info!(service = r.spec.name, %status, "Service stopped"),
                Ok(Err(e)) => warn!(service = r.spec.name, error = %e, "Failed to wait on service"),
                Err(_) => {
                    warn!(
                        service = r.spec.name,
                        grace_secs = grace.as_secs_f64(),
                        "Service did not stop in time, killing it"
                    );
                    if let Err(e) = r.child.kill().await {
                        warn!(service = r.spec.name, error = %e, "Failed to kill service");
                    }
                }
            }
        });
        join_all(stops).await;

        self.running.clear();
    }
}

/// 请求子进程优雅退出；已退出的子进程没有 pid，直接跳过
#[cfg(unix)]
fn terminate(r: &mut Running) {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let Some(pid) = r.child.id() else {
        return;
    };
    match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        Ok(()) => info!(service = r.spec.name, pid, "Forwarded SIGTERM"),
        Err(e) => warn!(service = r.spec.name, pid, error = %e, "Failed to forward SIGTERM"),
    }
}

#[cfg(not(unix))]
fn terminate(r: &mut Running) {
    if let Err(e) = r.child.start_kill() {
        warn!(service = r.spec.name, error = %e, "Failed to stop service");
    }
}
