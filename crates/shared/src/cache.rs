//! Redis 缓存管理模块
//!
//! 服务本身不缓存业务数据，Redis 只用于就绪检查和验证码签发频率计数。

use crate::config::RedisConfig;
use crate::error::{Result, SharedError};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Redis 客户端
#[derive(Clone)]
pub struct Cache {
    client: Client,
}

impl Cache {
    /// 创建 Redis 客户端（不会立即建立连接）
    pub fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;
        info!("Redis client created");
        Ok(Self { client })
    }

    /// 获取连接
    async fn get_conn(&self) -> Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(SharedError::from)
    }

    /// 健康检查
    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.get_conn().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(SharedError::from)
    }

    /// 增量操作
    pub async fn incr(&self, key: &str, delta: i64) -> Result<i64> {
        let mut conn = self.get_conn().await?;
        let result: i64 = conn.incr(key, delta).await?;
        Ok(result)
    }

    /// 设置过期时间
    pub async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.get_conn().await?;
        let _: () = conn.expire(key, ttl.as_secs() as i64).await?;
        Ok(())
    }

    /// 删除值
    #[instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.get_conn().await?;
        let _: () = conn.del(key).await?;
        Ok(())
    }

    /// 固定窗口计数器
    ///
    /// 返回剩余配额（负数表示已超限）。首次计数时设置窗口过期时间。
    pub async fn hit_window(&self, key: &str, max_hits: i64, window: Duration) -> Result<i64> {
        let count = self.incr(key, 1).await?;
        if count == 1 {
            if let Err(e) = self.expire(key, window).await {
                warn!(key, error = %e, "设置计数窗口过期时间失败");
            }
        }
        Ok(max_hits - count)
    }
}

/// 缓存键生成器
pub struct CacheKey;

impl CacheKey {
    /// 验证码签发计数键，`purpose` 区分密码重置和手机验证
    pub fn otp_issue(purpose: &str, target: &str) -> String {
        format!("otp:issue:{}:{}", purpose, target.to_lowercase())
    }
}
