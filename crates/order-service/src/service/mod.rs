//! 业务服务层
//!
//! 编排仓储调用并控制事务边界

mod order_service;
mod voucher_service;

pub use order_service::OrderService;
pub use voucher_service::VoucherService;
