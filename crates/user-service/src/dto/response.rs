//! user-service 响应 DTO 定义

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use easybuy_shared::PageResponse;

/// 用户信息（不含密码哈希）
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// 登录 / 注册响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: i64,
    pub user: UserDto,
}

/// 验证码签发响应
///
/// `otp` 仅在开发环境开启 `auth.expose_otp` 时返回
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpIssuedResponse {
    pub expires_in_secs: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

/// 收货地址
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AddressDto {
    pub id: i64,
    pub recipient_name: String,
    pub phone: String,
    pub address_line: String,
    pub ward: Option<String>,
    pub district: Option<String>,
    pub city: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 购物车条目
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemDto {
    pub product_id: i64,
    pub product_name: String,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub price: Decimal,
    pub image_url: Option<String>,
    pub quantity: i32,
    pub stock: i32,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub line_total: Decimal,
}

/// 购物车
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartDto {
    pub items: Vec<CartItemDto>,
    pub item_count: i64,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub subtotal: Decimal,
}

impl CartDto {
    /// 由条目汇总件数和小计
    pub fn from_items(items: Vec<CartItemDto>) -> Self {
        let item_count = items.iter().map(|i| i64::from(i.quantity)).sum();
        let subtotal = items.iter().map(|i| i.line_total).sum();
        Self {
            items,
            item_count,
            subtotal,
        }
    }
}

/// 收藏条目
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItemDto {
    pub product_id: i64,
    pub product_name: String,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub price: Decimal,
    pub stock: i32,
    pub image_url: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// 商品列表项
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductListItemDto {
    pub id: i64,
    pub name: String,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub price: Decimal,
    pub stock: i32,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub brand_id: Option<i64>,
    pub brand_name: Option<String>,
    pub image_url: Option<String>,
    pub average_rating: f64,
    pub review_count: i64,
}

/// 商品图片
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductImageDto {
    pub id: i64,
    pub image_url: String,
    pub sort_order: i32,
    pub is_primary: bool,
}

/// 评分汇总
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average_rating: f64,
    pub review_count: i64,
}

/// 商品详情
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailDto {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(serialize_with = "easybuy_shared::money::serialize")]
    pub price: Decimal,
    pub stock: i32,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub brand_id: Option<i64>,
    pub brand_name: Option<String>,
    pub is_active: bool,
    pub images: Vec<ProductImageDto>,
    pub rating: RatingSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 分类
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub product_count: i64,
}

/// 品牌
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BrandDto {
    pub id: i64,
    pub name: String,
    pub product_count: i64,
}

/// 评价
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub id: i64,
    pub product_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub rating: i16,
    pub comment: Option<String>,
    pub is_approved: bool,
    pub is_hidden: bool,
    pub created_at: DateTime<Utc>,
}

/// 站内通知
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDto {
    pub id: i64,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// 通知列表（分页 + 未读数）
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListDto {
    #[serde(flatten)]
    pub page: PageResponse<NotificationDto>,
    pub unread_count: i64,
}

/// 批量更新结果
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedCountDto {
    pub updated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn item(price: &str, quantity: i32) -> CartItemDto {
        let price = Decimal::from_str(price).unwrap();
        CartItemDto {
            product_id: 1,
            product_name: "Item".into(),
            price,
            image_url: None,
            quantity,
            stock: 10,
            line_total: price * Decimal::from(quantity),
        }
    }

    #[test]
    fn test_cart_totals() {
        let cart = CartDto::from_items(vec![item("199000.00", 2), item("50000.50", 1)]);
        assert_eq!(cart.item_count, 3);
        assert_eq!(cart.subtotal, Decimal::from_str("448000.50").unwrap());

        let empty = CartDto::from_items(Vec::new());
        assert_eq!(empty.item_count, 0);
        assert_eq!(empty.subtotal, Decimal::ZERO);
    }

    #[test]
    fn test_money_serialized_as_string() {
        let value = serde_json::to_value(CartDto::from_items(vec![item("10.50", 2)])).unwrap();
        assert_eq!(value["subtotal"], "21.00");
        assert_eq!(value["items"][0]["lineTotal"], "21.00");

        let empty = serde_json::to_value(CartDto::from_items(Vec::new())).unwrap();
        assert_eq!(empty["subtotal"], "0.00");
    }

    #[test]
    fn test_otp_hidden_unless_exposed() {
        let value = serde_json::to_value(OtpIssuedResponse {
            expires_in_secs: 600,
            otp: None,
        })
        .unwrap();
        assert!(value.get("otp").is_none());
        assert_eq!(value["expiresInSecs"], 600);
    }

    #[test]
    fn test_notification_list_flattens_page() {
        let list = NotificationListDto {
            page: PageResponse::empty(1, 20),
            unread_count: 4,
        };
        let value = serde_json::to_value(list).unwrap();
        assert_eq!(value["unreadCount"], 4);
        assert_eq!(value["pageSize"], 20);
        assert!(value["items"].as_array().unwrap().is_empty());
    }
}
