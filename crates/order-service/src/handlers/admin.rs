//! 管理员 API 处理器
//!
//! 订单状态管理和优惠券维护；角色检查在路由层完成

use axum::{
    Json,
    extract::{Path, Query, State},
};
use easybuy_shared::middleware::AuthUser;
use validator::Validate;

use crate::dto::{
    ApiResponse, CreateVoucherRequest, OrderDetailDto, OrderFilter, OrderSummaryDto, PageResponse,
    PaginationParams, UpdateOrderStatusRequest, UpdateVoucherRequest,
};
use crate::error::Result;
use crate::models::Voucher;
use crate::state::AppState;

// ==================== 订单 ====================

/// 全部订单，可按状态过滤
///
/// GET /api/admin/orders?status=
pub async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<ApiResponse<PageResponse<OrderSummaryDto>>>> {
    let page = state.orders.list_orders(None, filter.status, &params).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// GET /api/admin/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<OrderDetailDto>>> {
    let order = state.orders.get_order(id, None).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// 修改订单状态
///
/// PUT /api/admin/orders/{id}/status
pub async fn update_order_status(
    State(state): State<AppState>,
    admin: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<Json<ApiResponse<OrderDetailDto>>> {
    let order = state.orders.update_status(admin.id, id, req.status).await?;
    Ok(Json(ApiResponse::success(order)))
}

// ==================== 优惠券 ====================

/// POST /api/admin/vouchers
pub async fn create_voucher(
    State(state): State<AppState>,
    admin: AuthUser,
    Json(req): Json<CreateVoucherRequest>,
) -> Result<Json<ApiResponse<Voucher>>> {
    req.validate()?;

    let voucher = state.vouchers.create(admin.id, &req).await?;
    Ok(Json(ApiResponse::success(voucher)))
}

/// PUT /api/admin/vouchers/{id}
pub async fn update_voucher(
    State(state): State<AppState>,
    admin: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateVoucherRequest>,
) -> Result<Json<ApiResponse<Voucher>>> {
    req.validate()?;

    let voucher = state.vouchers.update(admin.id, id, &req).await?;
    Ok(Json(ApiResponse::success(voucher)))
}

/// DELETE /api/admin/vouchers/{id}
pub async fn delete_voucher(
    State(state): State<AppState>,
    admin: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    state.vouchers.delete(admin.id, id).await?;
    Ok(Json(ApiResponse::success_empty("Voucher deleted")))
}
