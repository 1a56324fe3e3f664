//! user-service 请求 DTO 定义
//!
//! 所有 REST API 的请求参数和请求体结构

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// 手机号：可选 `+` 前缀，8-15 位数字
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone");
        err.message = Some("must be a valid phone number".into());
        Err(err)
    }
}

/// 金额不能为负
pub fn validate_money(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("must not be negative".into());
        Err(err)
    } else {
        Ok(())
    }
}

// ==================== 认证 ====================

/// 注册请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, max = 100, message = "password must be 6-100 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "full name must be 1-100 characters"))]
    pub full_name: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
}

/// 登录请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// 忘记密码请求
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

/// 重置密码请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 4, max = 10, message = "one-time code must be 4-10 digits"))]
    pub otp: String,
    #[validate(length(min = 6, max = 100, message = "password must be 6-100 characters"))]
    pub new_password: String,
}

/// 发送手机验证码请求
#[derive(Debug, Deserialize, Validate)]
pub struct SendPhoneOtpRequest {
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
}

/// 校验手机验证码请求
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyPhoneRequest {
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(length(min = 4, max = 10, message = "one-time code must be 4-10 digits"))]
    pub otp: String,
}

// ==================== 个人资料 ====================

/// 更新资料请求，未提供的字段保持不变
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "full name must be 1-100 characters"))]
    pub full_name: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub avatar_url: Option<String>,
}

/// 修改密码请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, max = 100, message = "password must be 6-100 characters"))]
    pub new_password: String,
}

// ==================== 收货地址 ====================

/// 新建/修改收货地址
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    #[validate(length(min = 1, max = 100, message = "recipient name must be 1-100 characters"))]
    pub recipient_name: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(length(min = 1, max = 255, message = "address line must be 1-255 characters"))]
    pub address_line: String,
    #[validate(length(max = 100))]
    pub ward: Option<String>,
    #[validate(length(max = 100))]
    pub district: Option<String>,
    #[validate(length(min = 1, max = 100, message = "city is required"))]
    pub city: String,
    pub is_default: Option<bool>,
}

// ==================== 购物车 / 收藏 ====================

fn default_quantity() -> i32 {
    1
}

/// 加入购物车
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    #[validate(range(min = 1, message = "invalid product id"))]
    pub product_id: i64,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = 99, message = "quantity must be between 1 and 99"))]
    pub quantity: i32,
}

/// 修改购物车数量
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCartItemRequest {
    #[validate(range(min = 1, max = 99, message = "quantity must be between 1 and 99"))]
    pub quantity: i32,
}

/// 加入收藏
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddToWishlistRequest {
    #[validate(range(min = 1, message = "invalid product id"))]
    pub product_id: i64,
}

// ==================== 商品 / 评价 ====================

fn default_product_page() -> i64 {
    1
}

fn default_product_limit() -> i64 {
    12
}

/// 商品列表查询参数
///
/// 同时接受 snake_case 与 camelCase 的分类/品牌参数
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductQuery {
    #[validate(length(max = 100, message = "search term is too long"))]
    pub search: Option<String>,
    #[serde(alias = "categoryId")]
    pub category_id: Option<i64>,
    #[serde(alias = "brandId")]
    pub brand_id: Option<i64>,
    #[serde(default = "default_product_page")]
    pub page: i64,
    #[serde(default = "default_product_limit")]
    pub limit: i64,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            search: None,
            category_id: None,
            brand_id: None,
            page: default_product_page(),
            limit: default_product_limit(),
        }
    }
}

impl ProductQuery {
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    /// ILIKE 匹配模式，空白搜索词视为未提供
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)))
    }
}

/// 转义 LIKE 通配符，反斜杠为 PostgreSQL 默认转义符
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// 发表评价
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i16,
    #[validate(length(max = 2000, message = "comment must be at most 2000 characters"))]
    pub comment: Option<String>,
}

// ==================== 通知 ====================

/// 通知列表过滤
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFilter {
    #[serde(default)]
    pub unread_only: bool,
}

// ==================== 管理员 ====================

/// 创建商品
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom(function = "validate_money"))]
    pub price: Decimal,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    pub stock: i32,
    pub category_id: Option<i64>,
    pub brand_id: Option<i64>,
    pub is_active: Option<bool>,
}

/// 更新商品，未提供的字段保持不变
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_money"))]
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    pub stock: Option<i32>,
    pub category_id: Option<i64>,
    pub brand_id: Option<i64>,
    pub is_active: Option<bool>,
}

/// 添加商品图片
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddProductImageRequest {
    #[validate(url(message = "must be a valid URL"))]
    pub image_url: String,
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub is_primary: bool,
}

/// 评价审核
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ModerateReviewRequest {
    pub is_approved: Option<bool>,
    pub is_hidden: Option<bool>,
}

/// 向用户发送站内通知
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    #[validate(range(min = 1, message = "invalid user id"))]
    pub user_id: i64,
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "message must be 1-2000 characters"))]
    pub message: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 30))]
    pub kind: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_validation_reports_each_field() {
        let req = RegisterRequest {
            email: "not-an-email".into(),
            password: "123".into(),
            full_name: String::new(),
            phone: Some("12ab".into()),
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("full_name"));
        assert!(fields.contains_key("phone"));
    }

    #[test]
    fn test_seed_credentials_pass_validation() {
        let req = LoginRequest {
            email: "test@example.com".into(),
            password: "123456".into(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_phone_rules() {
        assert!(validate_phone("0901234567").is_ok());
        assert!(validate_phone("+84901234567").is_ok());
        assert!(validate_phone("123").is_err());
        assert!(validate_phone("09012345ab").is_err());
    }

    #[test]
    fn test_product_query_defaults_and_clamps() {
        let q: ProductQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 12);
        assert!(q.search_pattern().is_none());

        let q = ProductQuery {
            page: 3,
            limit: 500,
            search: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(q.limit(), 100);
        assert_eq!(q.offset(), 200);
        assert!(q.search_pattern().is_none());

        let q = ProductQuery {
            page: i64::MAX,
            limit: 100,
            ..Default::default()
        };
        assert_eq!(q.offset(), i64::MAX);
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        let q = ProductQuery {
            search: Some("50%_off".into()),
            ..Default::default()
        };
        assert_eq!(q.search_pattern().unwrap(), "%50\\%\\_off%");
    }

    #[test]
    fn test_cart_quantity_defaults_to_one() {
        let req: AddToCartRequest = serde_json::from_str(r#"{"productId": 5}"#).unwrap();
        assert_eq!(req.quantity, 1);
        assert!(req.validate().is_ok());

        let req: AddToCartRequest =
            serde_json::from_str(r#"{"productId": 5, "quantity": 0}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_negative_price_rejected() {
        let req: CreateProductRequest = serde_json::from_str(
            r#"{"name": "Áo thun", "price": "-1.00", "stock": 5}"#,
        )
        .unwrap();
        assert!(req.validate().unwrap_err().field_errors().contains_key("price"));
    }

    #[test]
    fn test_review_rating_range() {
        let req = CreateReviewRequest {
            rating: 6,
            comment: None,
        };
        assert!(req.validate().is_err());
    }
}
