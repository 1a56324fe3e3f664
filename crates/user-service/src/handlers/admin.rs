//! 管理员 API 处理器
//!
//! 商品、商品图片、评价审核和站内通知的管理接口。
//! 路由层已经完成管理员角色检查，这里只记录操作者。

use axum::{
    Json,
    extract::{Path, State},
};
use easybuy_shared::database::is_foreign_key_violation;
use easybuy_shared::middleware::AuthUser;
use sqlx::PgConnection;
use tracing::info;
use validator::Validate;

use super::product::load_product_detail;
use super::review::REVIEW_COLUMNS;
use crate::dto::{
    AddProductImageRequest, ApiResponse, CreateProductRequest, ModerateReviewRequest,
    NotificationDto, ProductDetailDto, ProductImageDto, ReviewDto, SendNotificationRequest,
    UpdateProductRequest,
};
use crate::error::{Result, UserServiceError};
use crate::state::AppState;

const DEFAULT_NOTIFICATION_TYPE: &str = "system";

/// 分类或品牌不存在时返回 400
fn map_reference_error(err: sqlx::Error) -> UserServiceError {
    if is_foreign_key_violation(&err) {
        UserServiceError::InvalidReference("category or brand does not exist".to_string())
    } else {
        err.into()
    }
}

/// 锁定商品行，串行化同一商品的图片写入
async fn lock_product(conn: &mut PgConnection, product_id: i64) -> Result<()> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1 FOR UPDATE")
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;
    row.map(|_| ())
        .ok_or(UserServiceError::ProductNotFound(product_id))
}

async fn clear_primary(conn: &mut PgConnection, product_id: i64) -> Result<()> {
    sqlx::query("UPDATE product_images SET is_primary = FALSE WHERE product_id = $1 AND is_primary")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

// ==================== 商品 ====================

/// 创建商品
///
/// POST /api/admin/products
pub async fn create_product(
    State(state): State<AppState>,
    admin: AuthUser,
    Json(req): Json<CreateProductRequest>,
) -> Result<Json<ApiResponse<ProductDetailDto>>> {
    req.validate()?;

    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO products (name, description, price, stock, category_id, brand_id, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(req.name.trim())
    .bind(&req.description)
    .bind(req.price)
    .bind(req.stock)
    .bind(req.category_id)
    .bind(req.brand_id)
    .bind(req.is_active.unwrap_or(true))
    .fetch_one(&state.pool)
    .await
    .map_err(map_reference_error)?;

    info!(admin_id = admin.id, product_id = id, "Product created");

    let product = load_product_detail(&state.pool, id, true).await?;
    Ok(Json(ApiResponse::success(product)))
}

/// 更新商品
///
/// PUT /api/admin/products/{id}
pub async fn update_product(
    State(state): State<AppState>,
    admin: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ApiResponse<ProductDetailDto>>> {
    req.validate()?;

    let updated: Option<(i64,)> = sqlx::query_as(
        r#"
        UPDATE products
        SET name = COALESCE($1, name),
            description = COALESCE($2, description),
            price = COALESCE($3, price),
            stock = COALESCE($4, stock),
            category_id = COALESCE($5, category_id),
            brand_id = COALESCE($6, brand_id),
            is_active = COALESCE($7, is_active),
            updated_at = NOW()
        WHERE id = $8
        RETURNING id
        "#,
    )
    .bind(req.name.as_deref().map(str::trim))
    .bind(&req.description)
    .bind(req.price)
    .bind(req.stock)
    .bind(req.category_id)
    .bind(req.brand_id)
    .bind(req.is_active)
    .bind(id)
    .fetch_optional(&state.pool)
    .await
    .map_err(map_reference_error)?;

    if updated.is_none() {
        return Err(UserServiceError::ProductNotFound(id));
    }

    info!(admin_id = admin.id, product_id = id, "Product updated");

    let product = load_product_detail(&state.pool, id, true).await?;
    Ok(Json(ApiResponse::success(product)))
}

/// 删除商品
///
/// DELETE /api/admin/products/{id}
///
/// 图片、评价、购物车和收藏随商品级联删除；订单明细保留商品名称和单价快照
pub async fn delete_product(
    State(state): State<AppState>,
    admin: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(UserServiceError::ProductNotFound(id));
    }

    info!(admin_id = admin.id, product_id = id, "Product deleted");

    Ok(Json(ApiResponse::success_empty("Product deleted")))
}

// ==================== 商品图片 ====================

/// 添加商品图片
///
/// POST /api/admin/products/{id}/images
///
/// 商品还没有主图时，新图片自动成为主图
pub async fn add_product_image(
    State(state): State<AppState>,
    admin: AuthUser,
    Path(product_id): Path<i64>,
    Json(req): Json<AddProductImageRequest>,
) -> Result<Json<ApiResponse<ProductImageDto>>> {
    req.validate()?;

    let mut tx = state.pool.begin().await?;
    lock_product(&mut tx, product_id).await?;

    let (has_primary, next_sort): (bool, i32) = sqlx::query_as(
        r#"
        SELECT COALESCE(BOOL_OR(is_primary), FALSE), COALESCE(MAX(sort_order) + 1, 0)
        FROM product_images
        WHERE product_id = $1
        "#,
    )
    .bind(product_id)
    .fetch_one(&mut *tx)
    .await?;

    let is_primary = req.is_primary || !has_primary;
    if is_primary && has_primary {
        clear_primary(&mut tx, product_id).await?;
    }

    let image = sqlx::query_as::<_, ProductImageDto>(
        r#"
        INSERT INTO product_images (product_id, image_url, sort_order, is_primary)
        VALUES ($1, $2, $3, $4)
        RETURNING id, image_url, sort_order, is_primary
        "#,
    )
    .bind(product_id)
    .bind(&req.image_url)
    .bind(req.sort_order.unwrap_or(next_sort))
    .bind(is_primary)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        admin_id = admin.id,
        product_id,
        image_id = image.id,
        is_primary,
        "Product image added"
    );

    Ok(Json(ApiResponse::success(image)))
}

/// 设为主图
///
/// PUT /api/admin/products/{id}/images/{image_id}/primary
pub async fn set_primary_image(
    State(state): State<AppState>,
    admin: AuthUser,
    Path((product_id, image_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<ProductImageDto>>> {
    let mut tx = state.pool.begin().await?;
    lock_product(&mut tx, product_id).await?;

    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM product_images WHERE id = $1 AND product_id = $2)",
    )
    .bind(image_id)
    .bind(product_id)
    .fetch_one(&mut *tx)
    .await?;
    if !exists {
        return Err(UserServiceError::ImageNotFound(image_id));
    }

    clear_primary(&mut tx, product_id).await?;

    let image = sqlx::query_as::<_, ProductImageDto>(
        r#"
        UPDATE product_images SET is_primary = TRUE
        WHERE id = $1 AND product_id = $2
        RETURNING id, image_url, sort_order, is_primary
        "#,
    )
    .bind(image_id)
    .bind(product_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(admin_id = admin.id, product_id, image_id, "Primary image changed");

    Ok(Json(ApiResponse::success(image)))
}

/// 删除商品图片
///
/// DELETE /api/admin/products/{id}/images/{image_id}
///
/// 删除主图后，排序最靠前的剩余图片成为主图
pub async fn delete_product_image(
    State(state): State<AppState>,
    admin: AuthUser,
    Path((product_id, image_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<()>>> {
    let mut tx = state.pool.begin().await?;
    lock_product(&mut tx, product_id).await?;

    let deleted: Option<(bool,)> = sqlx::query_as(
        "DELETE FROM product_images WHERE id = $1 AND product_id = $2 RETURNING is_primary",
    )
    .bind(image_id)
    .bind(product_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((was_primary,)) = deleted else {
        return Err(UserServiceError::ImageNotFound(image_id));
    };

    if was_primary {
        sqlx::query(
            r#"
            UPDATE product_images SET is_primary = TRUE
            WHERE id = (
                SELECT id FROM product_images
                WHERE product_id = $1
                ORDER BY sort_order ASC, id ASC
                LIMIT 1
            )
            "#,
        )
        .bind(product_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(admin_id = admin.id, product_id, image_id, was_primary, "Product image deleted");

    Ok(Json(ApiResponse::success_empty("Image deleted")))
}

// ==================== 评价审核 ====================

/// 审核评价（通过/隐藏）
///
/// PUT /api/admin/reviews/{id}/moderation
pub async fn moderate_review(
    State(state): State<AppState>,
    admin: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<ModerateReviewRequest>,
) -> Result<Json<ApiResponse<ReviewDto>>> {
    let updated: Option<(i64,)> = sqlx::query_as(
        r#"
        UPDATE product_reviews
        SET is_approved = COALESCE($1, is_approved),
            is_hidden = COALESCE($2, is_hidden),
            updated_at = NOW()
        WHERE id = $3
        RETURNING id
        "#,
    )
    .bind(req.is_approved)
    .bind(req.is_hidden)
    .bind(id)
    .fetch_optional(&state.pool)
    .await?;

    if updated.is_none() {
        return Err(UserServiceError::ReviewNotFound(id));
    }

    let review = sqlx::query_as::<_, ReviewDto>(&format!(
        r#"
        SELECT {REVIEW_COLUMNS}
        FROM product_reviews r
        JOIN users u ON u.id = r.user_id
        WHERE r.id = $1
        "#
    ))
    .bind(id)
    .fetch_one(&state.pool)
    .await?;

    info!(
        admin_id = admin.id,
        review_id = id,
        is_approved = review.is_approved,
        is_hidden = review.is_hidden,
        "Review moderated"
    );

    Ok(Json(ApiResponse::success(review)))
}

// ==================== 站内通知 ====================

/// 给指定用户发送站内通知
///
/// POST /api/admin/notifications
pub async fn send_notification(
    State(state): State<AppState>,
    admin: AuthUser,
    Json(req): Json<SendNotificationRequest>,
) -> Result<Json<ApiResponse<NotificationDto>>> {
    req.validate()?;

    let notification = sqlx::query_as::<_, NotificationDto>(
        r#"
        INSERT INTO notifications (user_id, title, message, type)
        VALUES ($1, $2, $3, $4)
        RETURNING id, title, message, type, is_read, created_at
        "#,
    )
    .bind(req.user_id)
    .bind(req.title.trim())
    .bind(req.message.trim())
    .bind(req.kind.as_deref().unwrap_or(DEFAULT_NOTIFICATION_TYPE))
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            UserServiceError::UserNotFound
        } else {
            e.into()
        }
    })?;

    info!(
        admin_id = admin.id,
        user_id = req.user_id,
        notification_id = notification.id,
        "Notification sent"
    );

    Ok(Json(ApiResponse::success(notification)))
}
