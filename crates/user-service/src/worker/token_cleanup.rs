//! 验证码清理 Worker
//!
//! 定期删除已使用或已过期、且超过保留时长的验证码记录，
//! 覆盖 `password_reset_tokens` 和 `otp_verifications` 两张表。
//! 删除条件只依赖时间戳，多实例同时运行也不会冲突。

use std::time::Duration;

use chrono::{DateTime, Utc};
use easybuy_shared::observability::metrics;
use sqlx::PgPool;
use tracing::{error, info};

const OTP_TABLES: [&str; 2] = ["password_reset_tokens", "otp_verifications"];

/// 单轮清理结果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupStats {
    pub password_reset_tokens: u64,
    pub otp_verifications: u64,
}

impl CleanupStats {
    pub fn total(&self) -> u64 {
        self.password_reset_tokens + self.otp_verifications
    }
}

/// 验证码清理 Worker
pub struct TokenCleanupWorker {
    pool: PgPool,
    /// 轮询间隔
    poll_interval: Duration,
    /// 终态记录的保留时长
    retention: chrono::Duration,
}

impl TokenCleanupWorker {
    pub fn new(pool: PgPool, poll_interval_secs: u64, retention_hours: i64) -> Self {
        Self {
            pool,
            poll_interval: Duration::from_secs(poll_interval_secs),
            retention: chrono::Duration::hours(retention_hours),
        }
    }

    /// 使用默认配置创建：每小时一轮，保留 24 小时
    pub fn with_defaults(pool: PgPool) -> Self {
        Self::new(pool, 3600, 24)
    }

    /// 主循环：持续清理直到进程退出
    pub async fn run(&self) {
        info!(
            poll_interval = ?self.poll_interval,
            retention_hours = self.retention.num_hours(),
            "TokenCleanupWorker started"
        );

        loop {
            match self.cleanup_once(Utc::now()).await {
                Ok(stats) if stats.total() > 0 => info!(
                    password_reset_tokens = stats.password_reset_tokens,
                    otp_verifications = stats.otp_verifications,
                    "Stale one-time codes removed"
                ),
                Ok(_) => {}
                Err(e) => error!(error = %e, "One-time code cleanup failed"),
            }

            metrics::set_worker_last_run("token_cleanup");

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// 执行一轮清理
    pub async fn cleanup_once(&self, now: DateTime<Utc>) -> Result<CleanupStats, sqlx::Error> {
        let cutoff = self.cutoff(now);
        let mut deleted = [0u64; 2];

        for (slot, table) in deleted.iter_mut().zip(OTP_TABLES) {
            let result = sqlx::query(&format!(
                r#"
                DELETE FROM {table}
                WHERE (used_at IS NOT NULL AND used_at < $1)
                   OR expires_at < $1
                "#
            ))
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
            *slot = result.rows_affected();
        }

        Ok(CleanupStats {
            password_reset_tokens: deleted[0],
            otp_verifications: deleted[1],
        })
    }

    /// 早于该时间进入终态的记录会被删除
    fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.retention
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lazy_pool() -> PgPool {
        PgPool::connect_lazy("postgres://localhost/test").unwrap()
    }

    #[tokio::test]
    async fn test_worker_defaults() {
        let worker = TokenCleanupWorker::with_defaults(lazy_pool());

        assert_eq!(worker.poll_interval.as_secs(), 3600);
        assert_eq!(worker.retention.num_hours(), 24);
    }

    #[tokio::test]
    async fn test_cutoff_subtracts_retention() {
        let worker = TokenCleanupWorker::new(lazy_pool(), 60, 6);
        let now = Utc::now();

        assert_eq!(worker.cutoff(now), now - chrono::Duration::hours(6));
    }

    #[test]
    fn test_stats_total() {
        let stats = CleanupStats {
            password_reset_tokens: 3,
            otp_verifications: 2,
        };
        assert_eq!(stats.total(), 5);
        assert_eq!(CleanupStats::default().total(), 0);
    }
}
