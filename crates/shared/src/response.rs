//! 统一响应结构
//!
//! 所有服务的 REST API 都使用 `{success, code, message, data}` 信封返回，
//! 分页数据使用 `PageResponse`。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::ValidationErrors;

/// API 统一响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "OK".to_string(),
            data: Some(data),
        }
    }

    /// 创建成功响应（自定义消息）
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// 创建成功响应（无数据）
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: message.into(),
            data: None,
        }
    }
}

/// 分页响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> PageResponse<T> {
    /// 创建分页响应
    pub fn new(items: Vec<T>, total: i64, page: i64, page_size: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total + page_size - 1) / page_size
        } else {
            0
        };

        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }

    /// 创建空分页响应
    pub fn empty(page: i64, page_size: i64) -> Self {
        Self::new(Vec::new(), 0, page, page_size)
    }
}

/// 通用分页参数
///
/// 同时接受 `limit` 与 `page_size` 两种写法
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit", alias = "page_size", alias = "pageSize")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PaginationParams {
    /// 规范化后的页码（最小为 1）
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// 获取限制条数（1..=100）
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, 100)
    }

    /// 计算数据库查询的 offset，页码过大时饱和到 `i64::MAX`
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// 字段级校验错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// 将 validator 的错误展开为按字段名排序的列表
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value ({})", e.code)),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field).then(a.message.cmp(&b.message)));
    fields
}

/// 构造错误响应体
///
/// `data` 为空时序列化为 null，便于前端统一解析
pub fn error_response(
    status: StatusCode,
    code: &str,
    message: String,
    data: Option<serde_json::Value>,
) -> Response {
    let body = json!({
        "success": false,
        "code": code,
        "message": message,
        "data": data.unwrap_or(serde_json::Value::Null),
    });

    (status, axum::Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    #[test]
    fn test_page_response_total_pages() {
        let page = PageResponse::new(vec![1, 2, 3], 25, 1, 10);
        assert_eq!(page.total_pages, 3);

        let empty: PageResponse<i32> = PageResponse::empty(1, 10);
        assert_eq!(empty.total_pages, 0);
        assert!(empty.items.is_empty());
    }

    #[test]
    fn test_pagination_clamps() {
        let p = PaginationParams { page: 0, limit: 1000 };
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 100);
        assert_eq!(p.offset(), 0);

        let p = PaginationParams { page: 3, limit: 12 };
        assert_eq!(p.offset(), 24);
    }

    #[test]
    fn test_pagination_huge_page_saturates() {
        let p: PaginationParams =
            serde_json::from_str(r#"{"page":9223372036854775807,"limit":100}"#).unwrap();
        assert_eq!(p.page(), i64::MAX);
        assert_eq!(p.offset(), i64::MAX);

        let page = PageResponse::<i64>::empty(p.page(), p.limit());
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_pagination_accepts_page_size_alias() {
        let p: PaginationParams = serde_json::from_str(r#"{"page":2,"page_size":5}"#).unwrap();
        assert_eq!(p.limit(), 5);
        assert_eq!(p.offset(), 5);
    }

    #[test]
    fn test_field_errors_sorted_with_messages() {
        let mut errors = ValidationErrors::new();
        let mut e1 = ValidationError::new("length");
        e1.message = Some("password must be at least 6 characters".into());
        errors.add("password", e1);
        errors.add("email", ValidationError::new("email"));

        let fields = field_errors(&errors);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field, "email");
        assert!(fields[0].message.contains("email"));
        assert_eq!(
            fields[1],
            FieldError::new("password", "password must be at least 6 characters")
        );
    }

    #[test]
    fn test_success_envelope_shape() {
        let value = serde_json::to_value(ApiResponse::success(vec![1])).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["code"], "SUCCESS");
        assert_eq!(value["data"], serde_json::json!([1]));

        let value = serde_json::to_value(ApiResponse::success_empty("deleted")).unwrap();
        assert!(value.get("data").is_none());
        assert_eq!(value["message"], "deleted");
    }
}
