//! 优惠券 API 处理器（顾客侧）

use axum::{Json, extract::State};
use validator::Validate;

use crate::dto::{ApiResponse, ValidateVoucherRequest, VoucherDto, VoucherPreviewDto};
use crate::error::Result;
use crate::state::AppState;

/// 当前可用的优惠券
///
/// GET /api/vouchers
pub async fn list_vouchers(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<VoucherDto>>>> {
    let vouchers = state.vouchers.list_active().await?;
    Ok(Json(ApiResponse::success(vouchers)))
}

/// 试算优惠券
///
/// POST /api/vouchers/validate
pub async fn validate_voucher(
    State(state): State<AppState>,
    Json(req): Json<ValidateVoucherRequest>,
) -> Result<Json<ApiResponse<VoucherPreviewDto>>> {
    req.validate()?;

    let preview = state.vouchers.preview(&req).await?;
    Ok(Json(ApiResponse::success(preview)))
}
