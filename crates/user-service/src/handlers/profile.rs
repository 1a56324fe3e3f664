//! 个人资料 API 处理器

use axum::{Json, extract::State};
use easybuy_shared::auth::{hash_password, verify_password};
use easybuy_shared::middleware::AuthUser;
use tracing::info;
use validator::Validate;

use super::auth::USER_COLUMNS;
use crate::dto::{ApiResponse, ChangePasswordRequest, UpdateProfileRequest, UserDto};
use crate::error::{Result, UserServiceError};
use crate::state::AppState;

/// 获取当前用户资料
///
/// GET /api/user/profile
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<UserDto>>> {
    let profile = sqlx::query_as::<_, UserDto>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(user.id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(UserServiceError::UserNotFound)?;

    Ok(Json(ApiResponse::success(profile)))
}

/// 更新资料
///
/// PUT /api/user/profile
///
/// 手机号需走验证码流程，这里不能直接修改
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserDto>>> {
    req.validate()?;

    let profile = sqlx::query_as::<_, UserDto>(&format!(
        r#"
        UPDATE users
        SET full_name = COALESCE($1, full_name),
            avatar_url = COALESCE($2, avatar_url),
            updated_at = NOW()
        WHERE id = $3
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(req.full_name.as_deref().map(str::trim))
    .bind(&req.avatar_url)
    .bind(user.id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(UserServiceError::UserNotFound)?;

    info!(user_id = user.id, "Profile updated");

    Ok(Json(ApiResponse::success(profile)))
}

/// 修改密码
///
/// PUT /api/user/password
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>> {
    req.validate()?;

    let (current_hash,): (String,) = sqlx::query_as("SELECT password_hash FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(UserServiceError::UserNotFound)?;

    if !verify_password(&req.current_password, &current_hash)? {
        return Err(UserServiceError::IncorrectPassword);
    }

    let new_hash = hash_password(&req.new_password)?;
    sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
        .bind(&new_hash)
        .bind(user.id)
        .execute(&state.pool)
        .await?;

    info!(user_id = user.id, "Password changed");

    Ok(Json(ApiResponse::success_empty("Password updated")))
}
