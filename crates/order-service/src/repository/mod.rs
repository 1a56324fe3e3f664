//! 数据库仓储层
//!
//! 仓储只负责数据持久化；需要原子性的多表写入以 `_in_tx` 关联函数提供，
//! 事务由服务层开启和提交

mod order_repo;
mod voucher_repo;

pub use order_repo::{NewOrder, OrderRecord, OrderRepository};
pub use voucher_repo::VoucherRepository;
