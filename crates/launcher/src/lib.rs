//! EasyBuy 启动器
//!
//! `easybuy` 命令：监督服务进程、执行迁移、写入演示数据、打印统计

pub mod cli;
pub mod seed;
pub mod stats;
pub mod supervisor;
