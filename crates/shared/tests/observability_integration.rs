//! 可观测性模块集成测试
//!
//! 测试 metrics、tracing 和 middleware 模块的核心功能。

// ============================================================================
// 指标记录测试
// ============================================================================

mod metrics_tests {
    use easybuy_shared::observability::metrics::{
        record_http_request, record_order_placed, record_otp_consumed, record_otp_issued,
        set_worker_last_run,
    };

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/api/products", 200, 0.05);
        record_http_request("POST", "/api/cart", 201, 0.12);
        record_http_request("PUT", "/api/user/addresses/3/default", 200, 0.08);
        record_http_request("DELETE", "/api/wishlist/9", 200, 0.03);
        record_http_request("GET", "/api/not-found", 404, 0.01);
        record_http_request("POST", "/api/orders", 500, 0.25);
    }

    #[test]
    fn test_record_otp_lifecycle() {
        record_otp_issued("password_reset");
        record_otp_issued("phone_verification");
        record_otp_consumed("password_reset", "consumed");
        record_otp_consumed("password_reset", "no_longer_valid");
        record_otp_consumed("phone_verification", "invalid");
    }

    #[test]
    fn test_record_orders_and_workers() {
        record_order_placed(false);
        record_order_placed(true);
        set_worker_last_run("token_cleanup");
    }

    #[test]
    fn test_edge_case_labels() {
        // 空字符串
        record_http_request("", "", 0, 0.0);
        record_otp_issued("");

        // 特殊字符
        record_http_request("GET", "/api/products?search=áo thun&page=2", 200, 0.01);

        // 极端持续时间
        record_http_request("GET", "/api/slow", 200, 999.99);
    }
}

// ============================================================================
// 日志初始化测试
// ============================================================================

mod tracing_tests {
    use easybuy_shared::config::ObservabilityConfig;
    use easybuy_shared::observability::tracing::{env_filter, init};

    #[test]
    fn test_env_filter_accepts_directives() {
        let _ = env_filter("debug");
        let _ = env_filter("easybuy_user_service=debug,sqlx=warn");
    }

    #[test]
    fn test_second_init_fails_instead_of_panicking() {
        let config = ObservabilityConfig {
            log_format: "json".to_string(),
            ..Default::default()
        };
        // 同一进程只能安装一次全局 subscriber，第二次必须返回错误
        let _ = init(&config);
        assert!(init(&config).is_err());
    }
}

// ============================================================================
// 请求 ID 测试
// ============================================================================

mod middleware_tests {
    use easybuy_shared::observability::middleware::{REQUEST_ID_HEADER, RequestId};

    #[test]
    fn test_request_id_creation() {
        let id = RequestId("test-id-123".to_string());
        assert_eq!(id.as_str(), "test-id-123");
    }

    #[test]
    fn test_request_id_clone() {
        let id1 = RequestId("original".to_string());
        let id2 = id1.clone();
        assert_eq!(id1.as_str(), id2.as_str());
    }

    #[test]
    fn test_header_name_is_lowercase() {
        assert_eq!(REQUEST_ID_HEADER, REQUEST_ID_HEADER.to_lowercase());
    }
}

// ============================================================================
// 配置测试
// ============================================================================

mod config_tests {
    use easybuy_shared::config::ObservabilityConfig;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.metrics_port, 9090);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, "pretty");
        assert!(!config.metrics_enabled);
    }
}

// ============================================================================
// Guard 测试
// ============================================================================

mod guard_tests {
    use easybuy_shared::observability::ObservabilityGuard;

    #[test]
    fn test_empty_guard() {
        let guard = ObservabilityGuard::empty();
        drop(guard);
    }
}
