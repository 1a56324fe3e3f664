//! CLI 模块
//!
//! - `start` - 启动 user-service 和 order-service 子进程
//! - `migrate` - 执行数据库迁移
//! - `seed` - 写入演示数据
//! - `stats` - 打印各表行数
//!
//! # 使用示例
//!
//! ```bash
//! easybuy migrate
//! easybuy seed
//! easybuy start --probe-delay-secs 5
//! easybuy stats
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands};
pub use runner::CommandRunner;
