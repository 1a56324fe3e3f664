//! 结算输入：购物车行与收货地址快照

use rust_decimal::Decimal;

use crate::error::OrderError;

/// 已锁定商品行的购物车条目
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartLine {
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: Decimal,
    pub stock: i32,
    pub is_active: bool,
    pub quantity: i32,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    /// 商品必须在售且库存足够
    pub fn ensure_available(&self) -> Result<(), OrderError> {
        if !self.is_active {
            return Err(OrderError::ProductUnavailable(self.product_name.clone()));
        }
        if self.quantity > self.stock {
            return Err(OrderError::InsufficientStock {
                product_id: self.product_id,
                product_name: self.product_name.clone(),
                available: self.stock,
            });
        }
        Ok(())
    }
}

/// 校验全部条目并返回小计
pub fn checkout_subtotal(lines: &[CartLine]) -> Result<Decimal, OrderError> {
    if lines.is_empty() {
        return Err(OrderError::EmptyCart);
    }
    let mut subtotal = Decimal::ZERO;
    for line in lines {
        line.ensure_available()?;
        subtotal += line.line_total();
    }
    Ok(subtotal)
}

/// 下单时的收货地址，以文本快照写入订单
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AddressSnapshot {
    pub recipient_name: String,
    pub phone: String,
    pub address_line: String,
    pub ward: Option<String>,
    pub district: Option<String>,
    pub city: String,
}

impl AddressSnapshot {
    pub fn to_text(&self) -> String {
        let location = [
            Some(self.address_line.as_str()),
            self.ward.as_deref(),
            self.district.as_deref(),
            Some(self.city.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

        format!("{} ({}), {}", self.recipient_name, self.phone, location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: i64, price: i64, quantity: i32, stock: i32) -> CartLine {
        CartLine {
            product_id,
            product_name: format!("Product {}", product_id),
            unit_price: Decimal::from(price),
            stock,
            is_active: true,
            quantity,
        }
    }

    #[test]
    fn test_subtotal_sums_lines() {
        let lines = vec![line(1, 100_000, 2, 5), line(2, 50_000, 1, 1)];
        assert_eq!(checkout_subtotal(&lines).unwrap(), Decimal::from(250_000));
    }

    #[test]
    fn test_empty_cart() {
        assert!(matches!(checkout_subtotal(&[]), Err(OrderError::EmptyCart)));
    }

    #[test]
    fn test_insufficient_stock_reports_product() {
        let lines = vec![line(1, 100, 1, 5), line(7, 100, 3, 2)];
        match checkout_subtotal(&lines) {
            Err(OrderError::InsufficientStock {
                product_id,
                available,
                ..
            }) => {
                assert_eq!(product_id, 7);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_inactive_product_rejected() {
        let mut l = line(1, 100, 1, 5);
        l.is_active = false;
        assert!(matches!(
            l.ensure_available(),
            Err(OrderError::ProductUnavailable(_))
        ));
    }

    #[test]
    fn test_address_snapshot_skips_missing_parts() {
        let address = AddressSnapshot {
            recipient_name: "Nguyen Van A".into(),
            phone: "0901234567".into(),
            address_line: "12 Nguyen Hue".into(),
            ward: None,
            district: Some("District 1".into()),
            city: "Ho Chi Minh City".into(),
        };
        assert_eq!(
            address.to_text(),
            "Nguyen Van A (0901234567), 12 Nguyen Hue, District 1, Ho Chi Minh City"
        );
    }
}
