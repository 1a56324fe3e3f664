//! test_utils 模块的集成测试
//!
//! 验证测试工具模块的功能正确性

use easybuy_shared::auth::ROLE_ADMIN;
use easybuy_shared::test_utils::*;
use serde_json::json;

// ==================== 配置辅助测试 ====================

#[test]
fn test_database_config_points_to_test_database() {
    let config = test_database_config();
    assert!(config.url.starts_with("postgres://"));
    assert_eq!(config.max_connections, 5);
}

#[test]
fn test_app_config_uses_test_environment() {
    let config = test_app_config("user-service");
    assert_eq!(config.service_name, "user-service");
    assert_eq!(config.environment, "test");
    assert!(config.validate().is_ok());
}

// ==================== Token 辅助测试 ====================

#[test]
fn test_admin_token_roundtrip() {
    let claims = test_jwt_manager().verify_token(&admin_token(1)).unwrap();
    assert_eq!(claims.role, ROLE_ADMIN);
    assert_eq!(claims.sub, "1");
}

#[test]
fn test_bearer_header_format() {
    assert_eq!(bearer("abc"), "Bearer abc");
}

// ==================== 测试数据生成器测试 ====================

#[test]
fn test_address_generation() {
    let address = TestDataGenerator::address("Nguyen Van A", true);
    assert_eq!(address["recipientName"], "Nguyen Van A");
    assert_eq!(address["isDefault"], true);
    TestAssertions::assert_json_has_field(&address, "city");
}

#[test]
fn test_product_generation() {
    let name = test_product_name();
    let product = TestDataGenerator::product(&name, "199000.00", 10);
    assert_eq!(product["name"], name);
    assert_eq!(product["price"], "199000.00");
    assert_eq!(product["stock"], 10);
}

#[test]
fn test_voucher_generation() {
    let voucher = TestDataGenerator::percentage_voucher("SALE10", "10", Some("50000"));
    assert_eq!(voucher["discountType"], "percentage");
    assert_eq!(voucher["maxDiscount"], "50000");
    assert_eq!(voucher["isActive"], true);
}

#[test]
fn test_place_order_generation() {
    let order = TestDataGenerator::place_order(3, None);
    assert_eq!(order["addressId"], 3);
    assert!(order["voucherCode"].is_null());
}

// ==================== 断言辅助测试 ====================

#[test]
fn test_json_field_eq() {
    let a = json!({"code": "SUCCESS", "n": 1});
    let b = json!({"code": "SUCCESS", "n": 2});
    TestAssertions::assert_json_field_eq(&a, &b, "code");
}

#[test]
#[should_panic]
fn test_assert_error_code_rejects_success() {
    let body = json!({"success": true, "code": "SUCCESS"});
    TestAssertions::assert_error_code(&body, "SUCCESS");
}
