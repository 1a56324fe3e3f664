//! 认证相关的 HTTP 处理器
//!
//! 注册、登录、忘记/重置密码以及手机号验证

use std::time::Duration;

use axum::{Json, extract::State};
use chrono::Utc;
use easybuy_shared::auth::{ROLE_CUSTOMER, hash_password, verify_password};
use easybuy_shared::cache::CacheKey;
use easybuy_shared::database::is_unique_violation;
use easybuy_shared::middleware::AuthUser;
use easybuy_shared::observability::metrics;
use sqlx::FromRow;
use tracing::{info, warn};
use validator::Validate;

use crate::dto::{
    ApiResponse, ForgotPasswordRequest, LoginRequest, LoginResponse, OtpIssuedResponse,
    RegisterRequest, ResetPasswordRequest, SendPhoneOtpRequest, UserDto, VerifyPhoneRequest,
};
use crate::error::{Result, UserServiceError};
use crate::notifier::otp_message;
use crate::otp::{self, OtpPurpose};
use crate::state::AppState;

/// 登录校验用的用户记录
#[derive(Debug, FromRow)]
struct UserCredentialRow {
    id: i64,
    email: String,
    password_hash: String,
    full_name: String,
    phone: Option<String>,
    avatar_url: Option<String>,
    role: String,
    is_active: bool,
    created_at: chrono::DateTime<Utc>,
}

impl From<UserCredentialRow> for UserDto {
    fn from(row: UserCredentialRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            phone: row.phone,
            avatar_url: row.avatar_url,
            role: row.role,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

pub(crate) const USER_COLUMNS: &str =
    "id, email, full_name, phone, avatar_url, role, is_active, created_at";

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn issue_token(state: &AppState, user: UserDto) -> Result<LoginResponse> {
    let (token, expires_at) = state.jwt.generate_token(user.id, &user.email, &user.role)?;
    Ok(LoginResponse {
        token,
        expires_at,
        user,
    })
}

/// 签发频率检查，Redis 不可用时放行
async fn check_issue_rate(state: &AppState, purpose: OtpPurpose, target: &str) -> Result<()> {
    let key = CacheKey::otp_issue(purpose.as_str(), target);
    let window = Duration::from_secs(state.auth.otp_issue_window_secs);

    match state
        .cache
        .hit_window(&key, state.auth.otp_issue_limit, window)
        .await
    {
        Ok(remaining) if remaining < 0 => {
            warn!(purpose = purpose.as_str(), "one-time code issue rate exceeded");
            Err(UserServiceError::TooManyOtpRequests)
        }
        Ok(_) => Ok(()),
        Err(e) => {
            warn!(error = %e, "rate limiter unavailable, allowing request");
            Ok(())
        }
    }
}

fn issued_response(state: &AppState, code: Option<String>) -> OtpIssuedResponse {
    OtpIssuedResponse {
        expires_in_secs: state.auth.otp_ttl_secs,
        otp: code.filter(|_| state.auth.expose_otp),
    }
}

/// 用户注册
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>> {
    req.validate()?;

    let email = normalize_email(&req.email);
    let password_hash = hash_password(&req.password)?;

    let user = sqlx::query_as::<_, UserDto>(&format!(
        r#"
        INSERT INTO users (email, password_hash, full_name, phone, role)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&email)
    .bind(&password_hash)
    .bind(req.full_name.trim())
    .bind(&req.phone)
    .bind(ROLE_CUSTOMER)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            UserServiceError::EmailExists
        } else {
            e.into()
        }
    })?;

    info!(user_id = user.id, "User registered");

    let response = issue_token(&state, user)?;
    Ok(Json(ApiResponse::success_with_message(
        response,
        "Registration successful",
    )))
}

/// 用户登录
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>> {
    req.validate()?;

    let user = sqlx::query_as::<_, UserCredentialRow>(
        r#"
        SELECT id, email, password_hash, full_name, phone, avatar_url, role, is_active, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(normalize_email(&req.email))
    .fetch_optional(&state.pool)
    .await?
    .ok_or(UserServiceError::InvalidCredentials)?;

    if !verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = user.id, "Login failed: wrong password");
        return Err(UserServiceError::InvalidCredentials);
    }

    if !user.is_active {
        return Err(UserServiceError::UserDisabled);
    }

    info!(user_id = user.id, "User logged in");

    let response = issue_token(&state, user.into())?;
    Ok(Json(ApiResponse::success(response)))
}

/// 忘记密码：签发邮件验证码
///
/// POST /api/auth/forgot-password
///
/// 未注册的邮箱返回同样的成功响应，只是不生成验证码
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<OtpIssuedResponse>>> {
    req.validate()?;

    let email = normalize_email(&req.email);
    check_issue_rate(&state, OtpPurpose::PasswordReset, &email).await?;

    let user: Option<(i64, bool)> =
        sqlx::query_as("SELECT id, is_active FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&state.pool)
            .await?;

    let code = match user {
        Some((user_id, true)) => {
            let code = otp::generate_code(state.auth.otp_length);
            let expires_at = otp::expires_at(Utc::now(), state.auth.otp_ttl_secs);

            let mut tx = state.pool.begin().await?;
            otp::issue_password_reset(&mut tx, user_id, &otp::hash_code(&code), expires_at)
                .await?;
            tx.commit().await?;

            metrics::record_otp_issued(OtpPurpose::PasswordReset.as_str());
            info!(user_id, "Password reset code issued");

            let body = otp_message(&code, state.auth.otp_ttl_secs);
            if let Err(e) = state
                .mailer
                .send(&email, "Reset your EasyBuy password", &body)
                .await
            {
                warn!(user_id, channel = state.mailer.channel(), error = %e, "Failed to deliver reset code");
            }
            Some(code)
        }
        _ => {
            info!("Password reset requested for unknown or disabled account");
            None
        }
    };

    Ok(Json(ApiResponse::success_with_message(
        issued_response(&state, code),
        "If the email is registered, a verification code has been sent",
    )))
}

/// 重置密码：消费验证码并更新密码，同一事务内完成
///
/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<()>>> {
    req.validate()?;

    let user: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(normalize_email(&req.email))
        .fetch_optional(&state.pool)
        .await?;
    let Some((user_id,)) = user else {
        metrics::record_otp_consumed(OtpPurpose::PasswordReset.as_str(), "invalid");
        return Err(UserServiceError::InvalidOtp);
    };

    let password_hash = hash_password(&req.new_password)?;

    let mut tx = state.pool.begin().await?;
    if let Err(e) = otp::consume_password_reset(&mut tx, user_id, &otp::hash_code(&req.otp)).await
    {
        metrics::record_otp_consumed(OtpPurpose::PasswordReset.as_str(), otp::failure_label(&e));
        return Err(e);
    }

    sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
        .bind(&password_hash)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    metrics::record_otp_consumed(OtpPurpose::PasswordReset.as_str(), "consumed");
    info!(user_id, "Password reset completed");

    Ok(Json(ApiResponse::success_empty("Password has been reset")))
}

/// 发送手机验证码
///
/// POST /api/auth/phone/send-otp
pub async fn send_phone_otp(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<SendPhoneOtpRequest>,
) -> Result<Json<ApiResponse<OtpIssuedResponse>>> {
    req.validate()?;

    check_issue_rate(&state, OtpPurpose::PhoneVerification, &req.phone).await?;

    let code = otp::generate_code(state.auth.otp_length);
    let expires_at = otp::expires_at(Utc::now(), state.auth.otp_ttl_secs);

    let mut tx = state.pool.begin().await?;
    otp::issue_phone_otp(&mut tx, user.id, &req.phone, &otp::hash_code(&code), expires_at).await?;
    tx.commit().await?;

    metrics::record_otp_issued(OtpPurpose::PhoneVerification.as_str());
    info!(user_id = user.id, "Phone verification code issued");

    let body = otp_message(&code, state.auth.otp_ttl_secs);
    if let Err(e) = state.sms.send(&req.phone, "", &body).await {
        warn!(user_id = user.id, channel = state.sms.channel(), error = %e, "Failed to deliver phone code");
    }

    Ok(Json(ApiResponse::success_with_message(
        issued_response(&state, Some(code)),
        "Verification code sent",
    )))
}

/// 校验手机验证码，成功后绑定手机号
///
/// POST /api/auth/phone/verify
pub async fn verify_phone(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<VerifyPhoneRequest>,
) -> Result<Json<ApiResponse<UserDto>>> {
    req.validate()?;

    let mut tx = state.pool.begin().await?;
    if let Err(e) =
        otp::consume_phone_otp(&mut tx, user.id, &req.phone, &otp::hash_code(&req.otp)).await
    {
        metrics::record_otp_consumed(OtpPurpose::PhoneVerification.as_str(), otp::failure_label(&e));
        return Err(e);
    }

    let updated = sqlx::query_as::<_, UserDto>(&format!(
        "UPDATE users SET phone = $1, updated_at = NOW() WHERE id = $2 RETURNING {USER_COLUMNS}"
    ))
    .bind(&req.phone)
    .bind(user.id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(UserServiceError::UserNotFound)?;

    tx.commit().await?;

    metrics::record_otp_consumed(OtpPurpose::PhoneVerification.as_str(), "consumed");
    info!(user_id = user.id, "Phone number verified");

    Ok(Json(ApiResponse::success(updated)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Test@Example.COM "), "test@example.com");
    }
}
