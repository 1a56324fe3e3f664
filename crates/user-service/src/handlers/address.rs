//! 收货地址 API 处理器
//!
//! 每个用户最多一个默认地址（部分唯一索引保证）。所有写操作先锁住用户行，
//! 同一用户的地址写入串行执行，再在事务中先清除旧标记、后设置新标记。

use axum::{
    Json,
    extract::{Path, State},
};
use easybuy_shared::middleware::AuthUser;
use sqlx::PgConnection;
use tracing::info;
use validator::Validate;

use crate::dto::{AddressDto, AddressRequest, ApiResponse};
use crate::error::{Result, UserServiceError};
use crate::state::AppState;

const ADDRESS_COLUMNS: &str = "id, recipient_name, phone, address_line, ward, district, city, \
                               is_default, created_at, updated_at";

async fn clear_default(conn: &mut PgConnection, user_id: i64) -> Result<()> {
    sqlx::query(
        "UPDATE user_addresses SET is_default = FALSE, updated_at = NOW() \
         WHERE user_id = $1 AND is_default",
    )
    .bind(user_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// 锁住用户行，串行化同一用户的并发地址写入
async fn lock_owner(conn: &mut PgConnection, user_id: i64) -> Result<()> {
    sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// 锁定并返回地址当前的默认标记，不属于该用户时返回 404
async fn lock_address(conn: &mut PgConnection, user_id: i64, id: i64) -> Result<bool> {
    let row: Option<(bool,)> = sqlx::query_as(
        "SELECT is_default FROM user_addresses WHERE id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    row.map(|(is_default,)| is_default)
        .ok_or(UserServiceError::AddressNotFound(id))
}

/// 获取地址列表，默认地址在前，其余按创建时间倒序
///
/// GET /api/user/addresses
pub async fn list_addresses(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<AddressDto>>>> {
    let addresses = sqlx::query_as::<_, AddressDto>(&format!(
        r#"
        SELECT {ADDRESS_COLUMNS}
        FROM user_addresses
        WHERE user_id = $1
        ORDER BY is_default DESC, created_at DESC, id DESC
        "#
    ))
    .bind(user.id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(addresses)))
}

/// 新建地址
///
/// POST /api/user/addresses
///
/// 用户的第一个地址自动成为默认地址
pub async fn create_address(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<AddressRequest>,
) -> Result<Json<ApiResponse<AddressDto>>> {
    req.validate()?;

    let mut tx = state.pool.begin().await?;

    lock_owner(&mut tx, user.id).await?;

    let (existing,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM user_addresses WHERE user_id = $1")
            .bind(user.id)
            .fetch_one(&mut *tx)
            .await?;

    let is_default = existing == 0 || req.is_default.unwrap_or(false);
    if is_default {
        clear_default(&mut tx, user.id).await?;
    }

    let address = sqlx::query_as::<_, AddressDto>(&format!(
        r#"
        INSERT INTO user_addresses
            (user_id, recipient_name, phone, address_line, ward, district, city, is_default)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {ADDRESS_COLUMNS}
        "#
    ))
    .bind(user.id)
    .bind(req.recipient_name.trim())
    .bind(&req.phone)
    .bind(req.address_line.trim())
    .bind(&req.ward)
    .bind(&req.district)
    .bind(req.city.trim())
    .bind(is_default)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(user_id = user.id, address_id = address.id, is_default, "Address created");

    Ok(Json(ApiResponse::success(address)))
}

/// 修改地址
///
/// PUT /api/user/addresses/{id}
///
/// `isDefault: true` 会转移默认标记；默认地址不能通过 `false` 取消，
/// 需要把其他地址设为默认
pub async fn update_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<AddressRequest>,
) -> Result<Json<ApiResponse<AddressDto>>> {
    req.validate()?;

    let mut tx = state.pool.begin().await?;
    lock_owner(&mut tx, user.id).await?;

    let was_default = lock_address(&mut tx, user.id, id).await?;
    let is_default = was_default || req.is_default.unwrap_or(false);
    if is_default && !was_default {
        clear_default(&mut tx, user.id).await?;
    }

    let address = sqlx::query_as::<_, AddressDto>(&format!(
        r#"
        UPDATE user_addresses
        SET recipient_name = $1, phone = $2, address_line = $3,
            ward = $4, district = $5, city = $6, is_default = $7, updated_at = NOW()
        WHERE id = $8 AND user_id = $9
        RETURNING {ADDRESS_COLUMNS}
        "#
    ))
    .bind(req.recipient_name.trim())
    .bind(&req.phone)
    .bind(req.address_line.trim())
    .bind(&req.ward)
    .bind(&req.district)
    .bind(req.city.trim())
    .bind(is_default)
    .bind(id)
    .bind(user.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(user_id = user.id, address_id = id, "Address updated");

    Ok(Json(ApiResponse::success(address)))
}

/// 删除地址
///
/// DELETE /api/user/addresses/{id}
///
/// 删除默认地址时，最新创建的剩余地址成为默认
pub async fn delete_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    let mut tx = state.pool.begin().await?;
    lock_owner(&mut tx, user.id).await?;

    let deleted: Option<(bool,)> = sqlx::query_as(
        "DELETE FROM user_addresses WHERE id = $1 AND user_id = $2 RETURNING is_default",
    )
    .bind(id)
    .bind(user.id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((was_default,)) = deleted else {
        return Err(UserServiceError::AddressNotFound(id));
    };

    if was_default {
        sqlx::query(
            r#"
            UPDATE user_addresses SET is_default = TRUE, updated_at = NOW()
            WHERE id = (
                SELECT id FROM user_addresses
                WHERE user_id = $1
                ORDER BY created_at DESC, id DESC
                LIMIT 1
            )
            "#,
        )
        .bind(user.id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(user_id = user.id, address_id = id, was_default, "Address deleted");

    Ok(Json(ApiResponse::success_empty("Address deleted")))
}

/// 设为默认地址
///
/// PUT /api/user/addresses/{id}/default
pub async fn set_default_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<AddressDto>>> {
    let mut tx = state.pool.begin().await?;
    lock_owner(&mut tx, user.id).await?;

    if !lock_address(&mut tx, user.id, id).await? {
        clear_default(&mut tx, user.id).await?;
    }

    let address = sqlx::query_as::<_, AddressDto>(&format!(
        r#"
        UPDATE user_addresses SET is_default = TRUE, updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING {ADDRESS_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(user_id = user.id, address_id = id, "Default address changed");

    Ok(Json(ApiResponse::success(address)))
}
