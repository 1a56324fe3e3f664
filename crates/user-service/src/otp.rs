//! 一次性验证码
//!
//! 密码重置和手机号验证共用同一套状态机：
//!
//! ```text
//! ISSUED ──consume──▶ CONSUMED
//!    └────timeout───▶ EXPIRED
//! ```
//!
//! CONSUMED 与 EXPIRED 都是终态。数据库只保存验证码的 SHA-256 哈希，
//! 消费通过一条带条件的 UPDATE 完成，并发请求中只有一个能成功。

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{FromRow, PgConnection};

use crate::error::{Result, UserServiceError};

/// 验证码用途
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    PasswordReset,
    PhoneVerification,
}

impl OtpPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PasswordReset => "password_reset",
            Self::PhoneVerification => "phone_verification",
        }
    }
}

/// 验证码状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpState {
    Issued,
    Consumed,
    Expired,
}

impl OtpState {
    /// 由存储字段推导当前状态，已使用优先于已过期
    pub fn of(used_at: Option<DateTime<Utc>>, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if used_at.is_some() {
            Self::Consumed
        } else if expires_at <= now {
            Self::Expired
        } else {
            Self::Issued
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Issued)
    }

    /// 消费被拒绝时的指标标签
    pub fn rejection_label(self) -> &'static str {
        match self {
            Self::Consumed => "already_used",
            Self::Expired => "expired",
            // 校验与读取之间恰好越过边界
            Self::Issued => "no_longer_valid",
        }
    }
}

/// 验证码消费失败的指标标签
pub fn failure_label(err: &UserServiceError) -> &'static str {
    match err {
        UserServiceError::InvalidOtp => "invalid",
        UserServiceError::OtpNoLongerValid(state) => state.rejection_label(),
        _ => "error",
    }
}

/// 生成指定位数的数字验证码
pub fn generate_code(length: u32) -> String {
    let mut rng = rand::rng();
    (0..length.max(1))
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// 验证码哈希（十六进制 SHA-256）
pub fn hash_code(code: &str) -> String {
    format!("{:x}", Sha256::digest(code.trim().as_bytes()))
}

/// 计算过期时间
pub fn expires_at(now: DateTime<Utc>, ttl_secs: i64) -> DateTime<Utc> {
    now + Duration::seconds(ttl_secs)
}

#[derive(FromRow)]
struct OtpRow {
    used_at: Option<DateTime<Utc>>,
    expires_at: DateTime<Utc>,
}

/// 消费失败时判定原因：哈希不存在为无效验证码，存在则说明已进入终态
fn rejection(row: Option<OtpRow>) -> UserServiceError {
    match row {
        None => UserServiceError::InvalidOtp,
        Some(row) => {
            UserServiceError::OtpNoLongerValid(OtpState::of(row.used_at, row.expires_at, Utc::now()))
        }
    }
}

/// 签发密码重置验证码
///
/// 同一用户此前未使用的验证码会被作废
pub async fn issue_password_reset(
    conn: &mut PgConnection,
    user_id: i64,
    code_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "UPDATE password_reset_tokens SET used_at = NOW() WHERE user_id = $1 AND used_at IS NULL",
    )
    .bind(user_id)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO password_reset_tokens (user_id, code_hash, expires_at)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(user_id)
    .bind(code_hash)
    .bind(expires_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// 消费密码重置验证码，需在事务中调用
pub async fn consume_password_reset(
    conn: &mut PgConnection,
    user_id: i64,
    code_hash: &str,
) -> Result<()> {
    let consumed: Option<(i64,)> = sqlx::query_as(
        r#"
        UPDATE password_reset_tokens
        SET used_at = NOW()
        WHERE user_id = $1 AND code_hash = $2
          AND used_at IS NULL AND expires_at > NOW()
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(code_hash)
    .fetch_optional(&mut *conn)
    .await?;

    if consumed.is_some() {
        return Ok(());
    }

    let row = sqlx::query_as::<_, OtpRow>(
        r#"
        SELECT used_at, expires_at FROM password_reset_tokens
        WHERE user_id = $1 AND code_hash = $2
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(code_hash)
    .fetch_optional(&mut *conn)
    .await?;

    Err(rejection(row))
}

/// 签发手机验证码
pub async fn issue_phone_otp(
    conn: &mut PgConnection,
    user_id: i64,
    phone: &str,
    code_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE otp_verifications SET used_at = NOW()
        WHERE user_id = $1 AND phone = $2 AND used_at IS NULL
        "#,
    )
    .bind(user_id)
    .bind(phone)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO otp_verifications (user_id, phone, code_hash, expires_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(user_id)
    .bind(phone)
    .bind(code_hash)
    .bind(expires_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// 消费手机验证码，需在事务中调用
pub async fn consume_phone_otp(
    conn: &mut PgConnection,
    user_id: i64,
    phone: &str,
    code_hash: &str,
) -> Result<()> {
    let consumed: Option<(i64,)> = sqlx::query_as(
        r#"
        UPDATE otp_verifications
        SET used_at = NOW()
        WHERE user_id = $1 AND phone = $2 AND code_hash = $3
          AND used_at IS NULL AND expires_at > NOW()
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(phone)
    .bind(code_hash)
    .fetch_optional(&mut *conn)
    .await?;

    if consumed.is_some() {
        return Ok(());
    }

    let row = sqlx::query_as::<_, OtpRow>(
        r#"
        SELECT used_at, expires_at FROM otp_verifications
        WHERE user_id = $1 AND phone = $2 AND code_hash = $3
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(phone)
    .bind(code_hash)
    .fetch_optional(&mut *conn)
    .await?;

    Err(rejection(row))
}
