//! 购物车 API 处理器
//!
//! 每个 (用户, 商品) 只有一行，重复加入时累加数量；数量不能超过库存。
//! 所有写操作返回更新后的完整购物车。

use axum::{
    Json,
    extract::{Path, State},
};
use easybuy_shared::middleware::AuthUser;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::info;
use validator::Validate;

use crate::dto::{AddToCartRequest, ApiResponse, CartDto, CartItemDto, UpdateCartItemRequest};
use crate::error::{Result, UserServiceError};
use crate::state::AppState;

#[derive(FromRow)]
struct CartRow {
    product_id: i64,
    product_name: String,
    price: Decimal,
    image_url: Option<String>,
    quantity: i32,
    stock: i32,
}

impl From<CartRow> for CartItemDto {
    fn from(row: CartRow) -> Self {
        Self {
            line_total: row.price * Decimal::from(row.quantity),
            product_id: row.product_id,
            product_name: row.product_name,
            price: row.price,
            image_url: row.image_url,
            quantity: row.quantity,
            stock: row.stock,
        }
    }
}

/// 读取用户购物车
async fn load_cart(pool: &PgPool, user_id: i64) -> Result<CartDto> {
    let rows = sqlx::query_as::<_, CartRow>(
        r#"
        SELECT c.product_id, p.name AS product_name, p.price, pi.image_url, c.quantity, p.stock
        FROM cart_items c
        JOIN products p ON p.id = c.product_id
        LEFT JOIN product_images pi ON pi.product_id = p.id AND pi.is_primary
        WHERE c.user_id = $1
        ORDER BY c.created_at ASC, c.id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(CartDto::from_items(
        rows.into_iter().map(CartItemDto::from).collect(),
    ))
}

/// 查询可售商品的库存
async fn product_stock(pool: &PgPool, product_id: i64) -> Result<i32> {
    let row: Option<(i32,)> =
        sqlx::query_as("SELECT stock FROM products WHERE id = $1 AND is_active")
            .bind(product_id)
            .fetch_optional(pool)
            .await?;
    row.map(|(stock,)| stock)
        .ok_or(UserServiceError::ProductNotFound(product_id))
}

/// 获取购物车
///
/// GET /api/cart
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<CartDto>>> {
    Ok(Json(ApiResponse::success(
        load_cart(&state.pool, user.id).await?,
    )))
}

/// 加入购物车
///
/// POST /api/cart
///
/// 已在购物车中则累加数量，累加后超过库存返回 409
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<AddToCartRequest>,
) -> Result<Json<ApiResponse<CartDto>>> {
    req.validate()?;

    let stock = product_stock(&state.pool, req.product_id).await?;
    if req.quantity > stock {
        return Err(UserServiceError::InsufficientStock { available: stock });
    }

    // 冲突更新带库存条件，不满足时不返回行
    let quantity: Option<(i32,)> = sqlx::query_as(
        r#"
        INSERT INTO cart_items (user_id, product_id, quantity)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, product_id) DO UPDATE
        SET quantity = cart_items.quantity + EXCLUDED.quantity, updated_at = NOW()
        WHERE cart_items.quantity + EXCLUDED.quantity <= $4
        RETURNING quantity
        "#,
    )
    .bind(user.id)
    .bind(req.product_id)
    .bind(req.quantity)
    .bind(stock)
    .fetch_optional(&state.pool)
    .await?;

    let Some((quantity,)) = quantity else {
        return Err(UserServiceError::InsufficientStock { available: stock });
    };

    info!(user_id = user.id, product_id = req.product_id, quantity, "Cart item added");

    Ok(Json(ApiResponse::success(
        load_cart(&state.pool, user.id).await?,
    )))
}

/// 修改数量
///
/// PUT /api/cart/{product_id}
pub async fn update_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<i64>,
    Json(req): Json<UpdateCartItemRequest>,
) -> Result<Json<ApiResponse<CartDto>>> {
    req.validate()?;

    let stock = product_stock(&state.pool, product_id).await?;
    if req.quantity > stock {
        return Err(UserServiceError::InsufficientStock { available: stock });
    }

    let result = sqlx::query(
        r#"
        UPDATE cart_items SET quantity = $1, updated_at = NOW()
        WHERE user_id = $2 AND product_id = $3
        "#,
    )
    .bind(req.quantity)
    .bind(user.id)
    .bind(product_id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(UserServiceError::CartItemNotFound(product_id));
    }

    Ok(Json(ApiResponse::success(
        load_cart(&state.pool, user.id).await?,
    )))
}

/// 移除单个商品
///
/// DELETE /api/cart/{product_id}
pub async fn remove_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<i64>,
) -> Result<Json<ApiResponse<CartDto>>> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
        .bind(user.id)
        .bind(product_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(UserServiceError::CartItemNotFound(product_id));
    }

    Ok(Json(ApiResponse::success(
        load_cart(&state.pool, user.id).await?,
    )))
}

/// 清空购物车
///
/// DELETE /api/cart
pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<CartDto>>> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user.id)
        .execute(&state.pool)
        .await?;

    info!(user_id = user.id, removed = result.rows_affected(), "Cart cleared");

    Ok(Json(ApiResponse::success(CartDto::from_items(Vec::new()))))
}
