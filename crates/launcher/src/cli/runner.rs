//! 命令执行器

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use easybuy_shared::config::AppConfig;
use easybuy_shared::database::Database;
use tracing::info;

use crate::seed;
use crate::stats;
use crate::supervisor::{ServiceSpec, Supervisor, default_bin_dir};

/// 由 launcher 启动的服务：(配置名, 二进制名)
pub const SERVICES: &[(&str, &str)] = &[
    ("user-service", "easybuy-user"),
    ("order-service", "easybuy-order"),
];

/// 命令执行器
pub struct CommandRunner {
    config: AppConfig,
}

impl CommandRunner {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    async fn connect(&self) -> Result<Database> {
        Database::connect(&self.config.database)
            .await
            .context("连接数据库失败")
    }

    /// 执行 start 命令
    pub async fn run_start(&self, bin_dir: Option<PathBuf>, probe_delay_secs: u64) -> Result<()> {
        let bin_dir = match bin_dir {
            Some(dir) => dir,
            None => default_bin_dir()?,
        };
        info!(bin_dir = %bin_dir.display(), "Starting EasyBuy services");

        let mut supervisor = Supervisor::new(bin_dir)?;
        for &(name, binary) in SERVICES {
            // 端口解析与子进程一致：配置文件 + 环境变量
            let port = AppConfig::load(name)
                .with_context(|| format!("加载 {} 配置失败", name))?
                .server
                .port;
            supervisor.spawn(ServiceSpec { name, binary, port })?;
        }

        tokio::time::sleep(Duration::from_secs(probe_delay_secs)).await;
        supervisor.probe_all().await;

        supervisor.wait().await?;
        info!("All services stopped");
        Ok(())
    }

    /// 执行 migrate 命令
    pub async fn run_migrate(&self) -> Result<()> {
        let db = self.connect().await?;
        sqlx::migrate!("../../migrations")
            .run(db.pool())
            .await
            .context("执行迁移失败")?;
        db.close().await;

        info!("Migrations applied");
        Ok(())
    }

    /// 执行 seed 命令
    pub async fn run_seed(&self) -> Result<()> {
        let db = self.connect().await?;
        let report = seed::run(db.pool()).await?;
        db.close().await;

        println!("Seed finished: {}", report);
        if report.total() == 0 {
            println!("Demo data already present, nothing inserted.");
        }
        println!(
            "Demo customer: {} / {}",
            seed::DEMO_CUSTOMER_EMAIL,
            seed::DEMO_CUSTOMER_PASSWORD
        );
        println!(
            "Demo admin:    {} / {}",
            seed::DEMO_ADMIN_EMAIL,
            seed::DEMO_ADMIN_PASSWORD
        );
        Ok(())
    }

    /// 执行 stats 命令
    pub async fn run_stats(&self) -> Result<()> {
        let db = self.connect().await?;
        let stats = stats::collect(db.pool()).await?;
        db.close().await;

        print!("{}", stats::render(&stats));
        Ok(())
    }
}
