//! 收藏夹 API 处理器

use axum::{
    Json,
    extract::{Path, State},
};
use easybuy_shared::middleware::AuthUser;
use tracing::info;
use validator::Validate;

use crate::dto::{AddToWishlistRequest, ApiResponse, WishlistItemDto};
use crate::error::{Result, UserServiceError};
use crate::state::AppState;

/// 获取收藏列表
///
/// GET /api/wishlist
pub async fn list_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<WishlistItemDto>>>> {
    let items = sqlx::query_as::<_, WishlistItemDto>(
        r#"
        SELECT w.product_id, p.name AS product_name, p.price, p.stock,
               pi.image_url, w.created_at AS added_at
        FROM wishlist w
        JOIN products p ON p.id = w.product_id
        LEFT JOIN product_images pi ON pi.product_id = p.id AND pi.is_primary
        WHERE w.user_id = $1
        ORDER BY w.created_at DESC, w.id DESC
        "#,
    )
    .bind(user.id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(items)))
}

/// 加入收藏
///
/// POST /api/wishlist
///
/// 依赖 (user_id, product_id) 唯一约束，重复加入返回 409 且不产生新行
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<AddToWishlistRequest>,
) -> Result<Json<ApiResponse<()>>> {
    req.validate()?;

    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
        .bind(req.product_id)
        .fetch_one(&state.pool)
        .await?;
    if !exists.0 {
        return Err(UserServiceError::ProductNotFound(req.product_id));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO wishlist (user_id, product_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, product_id) DO NOTHING
        "#,
    )
    .bind(user.id)
    .bind(req.product_id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(UserServiceError::AlreadyInWishlist);
    }

    info!(user_id = user.id, product_id = req.product_id, "Added to wishlist");

    Ok(Json(ApiResponse::success_empty("Added to wishlist")))
}

/// 移出收藏
///
/// DELETE /api/wishlist/{product_id}
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    let result = sqlx::query("DELETE FROM wishlist WHERE user_id = $1 AND product_id = $2")
        .bind(user.id)
        .bind(product_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(UserServiceError::WishlistItemNotFound(product_id));
    }

    Ok(Json(ApiResponse::success_empty("Removed from wishlist")))
}
