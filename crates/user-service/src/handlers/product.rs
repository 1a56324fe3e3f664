//! 商品目录 API 处理器
//!
//! 商品列表、详情、分类和品牌，均为公开接口

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use validator::Validate;

use crate::dto::{
    ApiResponse, BrandDto, CategoryDto, PageResponse, ProductDetailDto, ProductImageDto,
    ProductListItemDto, ProductQuery, RatingSummary,
};
use crate::error::{Result, UserServiceError};
use crate::state::AppState;

/// 商品详情查询结果
#[derive(FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: Option<String>,
    price: Decimal,
    stock: i32,
    category_id: Option<i64>,
    category_name: Option<String>,
    brand_id: Option<i64>,
    brand_name: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// 读取商品详情（含图片与评分）
///
/// `include_inactive` 为 false 时下架商品视为不存在
pub(crate) async fn load_product_detail(
    pool: &PgPool,
    id: i64,
    include_inactive: bool,
) -> Result<ProductDetailDto> {
    let row = sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT p.id, p.name, p.description, p.price, p.stock,
               p.category_id, c.name AS category_name,
               p.brand_id, b.name AS brand_name,
               p.is_active, p.created_at, p.updated_at
        FROM products p
        LEFT JOIN categories c ON c.id = p.category_id
        LEFT JOIN brands b ON b.id = p.brand_id
        WHERE p.id = $1 AND ($2 OR p.is_active)
        "#,
    )
    .bind(id)
    .bind(include_inactive)
    .fetch_optional(pool)
    .await?
    .ok_or(UserServiceError::ProductNotFound(id))?;

    let images = sqlx::query_as::<_, ProductImageDto>(
        r#"
        SELECT id, image_url, sort_order, is_primary
        FROM product_images
        WHERE product_id = $1
        ORDER BY is_primary DESC, sort_order ASC, id ASC
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let rating = sqlx::query_as::<_, RatingSummary>(
        r#"
        SELECT COALESCE(AVG(rating), 0)::float8 AS average_rating,
               COUNT(*) AS review_count
        FROM product_reviews
        WHERE product_id = $1 AND is_approved AND NOT is_hidden
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(ProductDetailDto {
        id: row.id,
        name: row.name,
        description: row.description,
        price: row.price,
        stock: row.stock,
        category_id: row.category_id,
        category_name: row.category_name,
        brand_id: row.brand_id,
        brand_name: row.brand_name,
        is_active: row.is_active,
        images,
        rating,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// 商品列表
///
/// GET /api/products?search=&category_id=&brand_id=&page=&limit=
///
/// 无匹配时返回空列表而不是 404
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ApiResponse<PageResponse<ProductListItemDto>>>> {
    query.validate()?;

    let pattern = query.search_pattern();

    let (total,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM products p
        WHERE p.is_active
          AND ($1::text IS NULL OR p.name ILIKE $1 OR p.description ILIKE $1)
          AND ($2::bigint IS NULL OR p.category_id = $2)
          AND ($3::bigint IS NULL OR p.brand_id = $3)
        "#,
    )
    .bind(&pattern)
    .bind(query.category_id)
    .bind(query.brand_id)
    .fetch_one(&state.pool)
    .await?;

    if total == 0 {
        return Ok(Json(ApiResponse::success(PageResponse::empty(
            query.page(),
            query.limit(),
        ))));
    }

    let items = sqlx::query_as::<_, ProductListItemDto>(
        r#"
        SELECT p.id, p.name, p.price, p.stock,
               p.category_id, c.name AS category_name,
               p.brand_id, b.name AS brand_name,
               pi.image_url,
               COALESCE(rs.average_rating, 0)::float8 AS average_rating,
               COALESCE(rs.review_count, 0) AS review_count
        FROM products p
        LEFT JOIN categories c ON c.id = p.category_id
        LEFT JOIN brands b ON b.id = p.brand_id
        LEFT JOIN product_images pi ON pi.product_id = p.id AND pi.is_primary
        LEFT JOIN LATERAL (
            SELECT AVG(r.rating) AS average_rating, COUNT(*) AS review_count
            FROM product_reviews r
            WHERE r.product_id = p.id AND r.is_approved AND NOT r.is_hidden
        ) rs ON TRUE
        WHERE p.is_active
          AND ($1::text IS NULL OR p.name ILIKE $1 OR p.description ILIKE $1)
          AND ($2::bigint IS NULL OR p.category_id = $2)
          AND ($3::bigint IS NULL OR p.brand_id = $3)
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(&pattern)
    .bind(query.category_id)
    .bind(query.brand_id)
    .bind(query.limit())
    .bind(query.offset())
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(PageResponse::new(
        items,
        total,
        query.page(),
        query.limit(),
    ))))
}

/// 商品详情
///
/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ProductDetailDto>>> {
    let product = load_product_detail(&state.pool, id, false).await?;
    Ok(Json(ApiResponse::success(product)))
}

/// 分类列表（含在售商品数）
///
/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CategoryDto>>>> {
    let categories = sqlx::query_as::<_, CategoryDto>(
        r#"
        SELECT c.id, c.name, c.slug, COUNT(p.id) AS product_count
        FROM categories c
        LEFT JOIN products p ON p.category_id = c.id AND p.is_active
        GROUP BY c.id
        ORDER BY c.name ASC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(categories)))
}

/// 品牌列表（含在售商品数）
///
/// GET /api/brands
pub async fn list_brands(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BrandDto>>>> {
    let brands = sqlx::query_as::<_, BrandDto>(
        r#"
        SELECT b.id, b.name, COUNT(p.id) AS product_count
        FROM brands b
        LEFT JOIN products p ON p.brand_id = b.id AND p.is_active
        GROUP BY b.id
        ORDER BY b.name ASC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(brands)))
}
