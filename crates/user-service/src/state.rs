//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use easybuy_shared::auth::JwtManager;
use easybuy_shared::cache::Cache;
use easybuy_shared::config::{AppConfig, AuthSettings};
use sqlx::PgPool;
use std::sync::Arc;

use crate::notifier::{EmailNotifier, Notifier, SmsNotifier};

/// Axum 应用共享状态
///
/// 在 main 中显式构造，通过 `State` 注入 handler
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL 连接池
    pub pool: PgPool,
    /// Redis 客户端，只用于验证码签发限流
    pub cache: Arc<Cache>,
    pub jwt: JwtManager,
    /// 邮件通道（密码重置）
    pub mailer: Arc<dyn Notifier>,
    /// 短信通道（手机验证）
    pub sms: Arc<dyn Notifier>,
    pub auth: AuthSettings,
}

impl AppState {
    /// 按配置创建应用状态
    pub fn new(pool: PgPool, cache: Arc<Cache>, config: &AppConfig) -> Self {
        Self {
            pool,
            cache,
            jwt: JwtManager::new(config.jwt.clone()),
            mailer: Arc::new(EmailNotifier::new(config.mail.clone())),
            sms: Arc::new(SmsNotifier::new(config.sms.clone())),
            auth: config.auth.clone(),
        }
    }

    /// 替换投递通道（测试中注入 mock）
    pub fn with_notifiers(mut self, mailer: Arc<dyn Notifier>, sms: Arc<dyn Notifier>) -> Self {
        self.mailer = mailer;
        self.sms = sms;
        self
    }
}
