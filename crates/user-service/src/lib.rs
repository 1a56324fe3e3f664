//! EasyBuy 用户服务
//!
//! 面向顾客的账户与商品浏览 REST API。
//!
//! ## 核心功能
//!
//! - **账户**：注册、登录、邮件验证码找回密码、短信验证码绑定手机
//! - **资料与地址**：个人资料、密码修改、收货地址及默认地址
//! - **购物**：购物车、收藏夹
//! - **商品目录**：商品搜索与详情、分类、品牌、评价
//! - **站内通知**：列表、已读标记
//! - **管理后台**：商品与图片维护、评价审核、发送通知
//!
//! ## 模块结构
//!
//! - `dto`: 请求和响应的数据传输对象
//! - `error`: 错误类型定义
//! - `handlers`: HTTP 请求处理器
//! - `notifier`: 邮件/短信投递通道
//! - `otp`: 一次性验证码的签发与核销
//! - `routes`: 路由配置
//! - `state`: 应用状态
//! - `worker`: 后台清理任务

pub mod dto;
pub mod error;
pub mod handlers;
pub mod notifier;
pub mod otp;
pub mod routes;
pub mod state;
pub mod worker;

pub use error::{Result, UserServiceError};
pub use state::AppState;
