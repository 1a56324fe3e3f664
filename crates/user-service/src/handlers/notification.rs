//! 站内通知 API 处理器

use axum::{
    Json,
    extract::{Path, Query, State},
};
use easybuy_shared::middleware::AuthUser;

use crate::dto::{
    ApiResponse, NotificationDto, NotificationFilter, NotificationListDto, PageResponse,
    PaginationParams, UpdatedCountDto,
};
use crate::error::{Result, UserServiceError};
use crate::state::AppState;

/// 通知列表，按时间倒序，附带未读数
///
/// GET /api/notifications?page=&limit=&unreadOnly=
pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PaginationParams>,
    Query(filter): Query<NotificationFilter>,
) -> Result<Json<ApiResponse<NotificationListDto>>> {
    let (total, unread_count): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FILTER (WHERE NOT $2 OR NOT is_read),
               COUNT(*) FILTER (WHERE NOT is_read)
        FROM notifications
        WHERE user_id = $1
        "#,
    )
    .bind(user.id)
    .bind(filter.unread_only)
    .fetch_one(&state.pool)
    .await?;

    let items = sqlx::query_as::<_, NotificationDto>(
        r#"
        SELECT id, title, message, type, is_read, created_at
        FROM notifications
        WHERE user_id = $1 AND (NOT $2 OR NOT is_read)
        ORDER BY created_at DESC, id DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(user.id)
    .bind(filter.unread_only)
    .bind(params.limit())
    .bind(params.offset())
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(NotificationListDto {
        page: PageResponse::new(items, total, params.page(), params.limit()),
        unread_count,
    })))
}

/// 标记单条已读
///
/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<NotificationDto>>> {
    let notification = sqlx::query_as::<_, NotificationDto>(
        r#"
        UPDATE notifications SET is_read = TRUE
        WHERE id = $1 AND user_id = $2
        RETURNING id, title, message, type, is_read, created_at
        "#,
    )
    .bind(id)
    .bind(user.id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(UserServiceError::NotificationNotFound(id))?;

    Ok(Json(ApiResponse::success(notification)))
}

/// 全部标记已读
///
/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<UpdatedCountDto>>> {
    let result =
        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read")
            .bind(user.id)
            .execute(&state.pool)
            .await?;

    Ok(Json(ApiResponse::success(UpdatedCountDto {
        updated: result.rows_affected(),
    })))
}
