//! CLI 命令定义

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// EasyBuy 运维命令行工具
#[derive(Parser, Debug)]
#[command(name = "easybuy")]
#[command(version, about = "EasyBuy 服务启动与数据库维护工具")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别，`RUST_LOG` 优先
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 启动全部服务并监督子进程
    ///
    /// 收到 Ctrl+C / SIGTERM 或任一子进程退出时，结束其余子进程
    Start {
        /// 服务二进制所在目录，默认与当前可执行文件同目录
        #[arg(long)]
        bin_dir: Option<PathBuf>,

        /// 启动后多久探测 /health（秒）
        #[arg(long, default_value = "3")]
        probe_delay_secs: u64,
    },

    /// 执行 migrations/ 下的数据库迁移
    Migrate,

    /// 写入演示数据，可重复执行
    Seed,

    /// 打印各表行数和订单状态分布
    Stats,
}
