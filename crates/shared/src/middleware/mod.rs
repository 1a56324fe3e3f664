//! 中间件模块
//!
//! 提供 JWT 认证和角色检查中间件，以及获取当前用户的提取器

mod auth;
mod role;

pub use auth::{AuthUser, auth_middleware, bearer_token};
pub use role::{require_admin, require_role};
