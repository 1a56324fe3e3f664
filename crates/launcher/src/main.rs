//! EasyBuy 启动器入口

use clap::Parser;
use easybuy_launcher::cli::{Cli, CommandRunner, Commands};
use easybuy_shared::config::AppConfig;
use easybuy_shared::observability;

const CONFIG_NAME: &str = "launcher";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(CONFIG_NAME)?;
    // 命令行级别覆盖配置文件，RUST_LOG 仍然优先
    config.observability.log_level = cli.log_level.clone();
    observability::tracing::init(&config.observability)?;

    let runner = CommandRunner::new(config);

    match cli.command {
        Commands::Start {
            bin_dir,
            probe_delay_secs,
        } => runner.run_start(bin_dir, probe_delay_secs).await?,
        Commands::Migrate => runner.run_migrate().await?,
        Commands::Seed => runner.run_seed().await?,
        Commands::Stats => runner.run_stats().await?,
    }

    Ok(())
}
