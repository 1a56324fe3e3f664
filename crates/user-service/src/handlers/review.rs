//! 商品评价 API 处理器

use axum::{
    Json,
    extract::{Path, Query, State},
};
use easybuy_shared::database::is_unique_violation;
use easybuy_shared::middleware::AuthUser;
use tracing::info;
use validator::Validate;

use crate::dto::{ApiResponse, CreateReviewRequest, PageResponse, PaginationParams, ReviewDto};
use crate::error::{Result, UserServiceError};
use crate::state::AppState;

pub(crate) const REVIEW_COLUMNS: &str = "r.id, r.product_id, r.user_id, u.full_name AS user_name, \
                                         r.rating, r.comment, r.is_approved, r.is_hidden, r.created_at";

async fn ensure_product(state: &AppState, product_id: i64) -> Result<()> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1 AND is_active)")
            .bind(product_id)
            .fetch_one(&state.pool)
            .await?;
    if exists {
        Ok(())
    } else {
        Err(UserServiceError::ProductNotFound(product_id))
    }
}

/// 商品评价列表，只包含已审核且未隐藏的评价
///
/// GET /api/products/{id}/reviews
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<ReviewDto>>>> {
    ensure_product(&state, product_id).await?;

    let (total,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM product_reviews
        WHERE product_id = $1 AND is_approved AND NOT is_hidden
        "#,
    )
    .bind(product_id)
    .fetch_one(&state.pool)
    .await?;

    let reviews = sqlx::query_as::<_, ReviewDto>(&format!(
        r#"
        SELECT {REVIEW_COLUMNS}
        FROM product_reviews r
        JOIN users u ON u.id = r.user_id
        WHERE r.product_id = $1 AND r.is_approved AND NOT r.is_hidden
        ORDER BY r.created_at DESC, r.id DESC
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(product_id)
    .bind(params.limit())
    .bind(params.offset())
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(PageResponse::new(
        reviews,
        total,
        params.page(),
        params.limit(),
    ))))
}

/// 发表评价，每个用户对每个商品只能评价一次
///
/// POST /api/products/{id}/reviews
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<i64>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<Json<ApiResponse<ReviewDto>>> {
    req.validate()?;
    ensure_product(&state, product_id).await?;

    let comment = req
        .comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let inserted: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO product_reviews (user_id, product_id, rating, comment)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(user.id)
    .bind(product_id)
    .bind(req.rating)
    .bind(comment)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            UserServiceError::AlreadyReviewed
        } else {
            e.into()
        }
    })?;

    let review = sqlx::query_as::<_, ReviewDto>(&format!(
        r#"
        SELECT {REVIEW_COLUMNS}
        FROM product_reviews r
        JOIN users u ON u.id = r.user_id
        WHERE r.id = $1
        "#
    ))
    .bind(inserted.0)
    .fetch_one(&state.pool)
    .await?;

    info!(
        user_id = user.id,
        product_id,
        review_id = review.id,
        rating = req.rating,
        "Review created"
    );

    Ok(Json(ApiResponse::success(review)))
}
