//! HTTP 请求处理器

pub mod admin;
pub mod health;
pub mod order;
pub mod voucher;
