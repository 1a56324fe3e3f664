//! 优惠券服务

use std::sync::Arc;

use chrono::Utc;
use easybuy_shared::database::is_unique_violation;
use tracing::info;

use crate::dto::{
    CreateVoucherRequest, UpdateVoucherRequest, ValidateVoucherRequest, VoucherDto,
    VoucherPreviewDto, normalize_code,
};
use crate::dto::request::{check_percentage, check_window};
use crate::error::{OrderError, Result};
use crate::models::{OrderTotals, ShippingPolicy, Voucher};
use crate::repository::VoucherRepository;

/// 优惠券服务
pub struct VoucherService {
    voucher_repo: Arc<VoucherRepository>,
    shipping: ShippingPolicy,
}

impl VoucherService {
    pub fn new(voucher_repo: Arc<VoucherRepository>, shipping: ShippingPolicy) -> Self {
        Self {
            voucher_repo,
            shipping,
        }
    }

    /// 当前可用的优惠券
    pub async fn list_active(&self) -> Result<Vec<VoucherDto>> {
        let vouchers = self.voucher_repo.list_active(Utc::now()).await?;
        Ok(vouchers.into_iter().map(VoucherDto::from).collect())
    }

    /// 试算优惠券对给定小计的折扣，不占用次数
    pub async fn preview(&self, req: &ValidateVoucherRequest) -> Result<VoucherPreviewDto> {
        let code = normalize_code(&req.code);
        let voucher = self
            .voucher_repo
            .find_by_code(&code)
            .await?
            .ok_or_else(|| OrderError::VoucherNotFound(code.clone()))?;

        let discount = voucher.apply(req.subtotal, Utc::now())?;
        let totals = OrderTotals::compute(req.subtotal, discount, &self.shipping);

        Ok(VoucherPreviewDto {
            code: voucher.code,
            subtotal: totals.subtotal,
            discount: totals.discount,
            shipping_fee: totals.shipping_fee,
            total: totals.total,
        })
    }

    pub async fn create(&self, admin_id: i64, req: &CreateVoucherRequest) -> Result<Voucher> {
        let now = Utc::now();
        req.check_rules(now)?;

        let code = normalize_code(&req.code);
        let voucher = self
            .voucher_repo
            .create(req, &code, now)
            .await
            .map_err(map_duplicate_code)?;

        info!(admin_id, voucher_id = voucher.id, code = %voucher.code, "Voucher created");
        Ok(voucher)
    }

    /// 部分更新；合并后的取值仍需满足百分比上限和有效期规则
    pub async fn update(&self, admin_id: i64, id: i64, req: &UpdateVoucherRequest) -> Result<Voucher> {
        let current = self
            .voucher_repo
            .get(id)
            .await?
            .ok_or(OrderError::VoucherIdNotFound(id))?;

        check_percentage(
            req.discount_type.unwrap_or(current.discount_type),
            req.discount_value.unwrap_or(current.discount_value),
        )?;
        check_window(
            req.starts_at.unwrap_or(current.starts_at),
            req.expires_at.unwrap_or(current.expires_at),
        )?;

        let voucher = self
            .voucher_repo
            .update(id, req)
            .await?
            .ok_or(OrderError::VoucherIdNotFound(id))?;

        info!(admin_id, voucher_id = id, "Voucher updated");
        Ok(voucher)
    }

    pub async fn delete(&self, admin_id: i64, id: i64) -> Result<()> {
        if !self.voucher_repo.delete(id).await? {
            return Err(OrderError::VoucherIdNotFound(id));
        }
        info!(admin_id, voucher_id = id, "Voucher deleted");
        Ok(())
    }
}

fn map_duplicate_code(err: OrderError) -> OrderError {
    match err {
        OrderError::Database(e) if is_unique_violation(&e) => OrderError::VoucherCodeExists,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_code_mapping_keeps_other_errors() {
        let mapped = map_duplicate_code(OrderError::Database(sqlx::Error::RowNotFound));
        assert!(matches!(mapped, OrderError::Database(_)));

        let mapped = map_duplicate_code(OrderError::EmptyCart);
        assert!(matches!(mapped, OrderError::EmptyCart));
    }
}
