//! EasyBuy 订单服务
//!
//! 下单结算、订单查询与取消、优惠券，以及对应的管理后台接口。
//!
//! ## 模块结构
//!
//! - `models`: 订单状态机、优惠券规则、金额计算
//! - `repository`: 数据访问，事务内操作以 `_in_tx` 结尾
//! - `service`: 下单和状态流转的事务编排
//! - `handlers` / `routes`: HTTP 层

pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;

pub use error::{OrderError, Result};
pub use state::AppState;
