//! 认证模块
//!
//! 提供 JWT Token 生成、验证和密码处理功能

mod jwt;
mod password;

pub use jwt::{Claims, JwtManager, ROLE_ADMIN, ROLE_CUSTOMER};
pub use password::{hash_password, verify_password};
