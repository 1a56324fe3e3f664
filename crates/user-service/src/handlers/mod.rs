//! HTTP 请求处理器

pub mod address;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod health;
pub mod notification;
pub mod product;
pub mod profile;
pub mod review;
pub mod wishlist;
