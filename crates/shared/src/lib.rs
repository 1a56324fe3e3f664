//! 共享库
//!
//! 包含 user-service 与 order-service 共用的配置、错误处理、数据库连接池、
//! Redis 缓存、JWT 认证中间件、统一响应结构以及可观测性基础设施。

pub mod auth;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod money;
pub mod observability;
pub mod response;
pub mod server;
pub mod test_utils;

pub use error::{Result, SharedError};
pub use response::{ApiResponse, FieldError, PageResponse, PaginationParams};
