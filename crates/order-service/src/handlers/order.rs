//! 订单 API 处理器

use axum::{
    Json,
    extract::{Path, Query, State},
};
use easybuy_shared::middleware::AuthUser;
use validator::Validate;

use crate::dto::{
    ApiResponse, OrderDetailDto, OrderFilter, OrderSummaryDto, PageResponse, PaginationParams,
    PlaceOrderRequest,
};
use crate::error::Result;
use crate::state::AppState;

/// 按当前购物车下单
///
/// POST /api/orders
pub async fn place_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<Json<ApiResponse<OrderDetailDto>>> {
    req.validate()?;

    let order = state.orders.place_order(user.id, &req).await?;
    Ok(Json(ApiResponse::success_with_message(order, "Order placed")))
}

/// 我的订单
///
/// GET /api/orders?page=&limit=&status=
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PaginationParams>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<ApiResponse<PageResponse<OrderSummaryDto>>>> {
    let page = state
        .orders
        .list_orders(Some(user.id), filter.status, &params)
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<OrderDetailDto>>> {
    let order = state.orders.get_order(id, Some(user.id)).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// 取消订单，库存回补
///
/// PUT /api/orders/{id}/cancel
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<OrderDetailDto>>> {
    let order = state.orders.cancel_order(user.id, id).await?;
    Ok(Json(ApiResponse::success_with_message(order, "Order cancelled")))
}
