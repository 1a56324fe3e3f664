//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    Router,
    middleware,
    routing::{delete, get, post, put},
};
use easybuy_shared::auth::JwtManager;
use easybuy_shared::config::ServerConfig;
use easybuy_shared::middleware::{auth_middleware, require_admin};
use easybuy_shared::server::with_http_layers;

use crate::{handlers, state::AppState};

/// 公开路由：注册登录、密码找回、商品浏览
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/forgot-password", post(handlers::auth::forgot_password))
        .route("/auth/reset-password", post(handlers::auth::reset_password))
        .route("/products", get(handlers::product::list_products))
        .route("/products/{id}", get(handlers::product::get_product))
        .route(
            "/products/{id}/reviews",
            get(handlers::review::list_reviews),
        )
        .route("/categories", get(handlers::product::list_categories))
        .route("/brands", get(handlers::product::list_brands))
}

/// 需要登录的路由
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        // 手机验证
        .route("/auth/phone/send-otp", post(handlers::auth::send_phone_otp))
        .route("/auth/phone/verify", post(handlers::auth::verify_phone))
        // 个人资料
        .route(
            "/user/profile",
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        )
        .route("/user/password", put(handlers::profile::change_password))
        // 收货地址
        .route(
            "/user/addresses",
            get(handlers::address::list_addresses).post(handlers::address::create_address),
        )
        .route(
            "/user/addresses/{id}",
            put(handlers::address::update_address).delete(handlers::address::delete_address),
        )
        .route(
            "/user/addresses/{id}/default",
            put(handlers::address::set_default_address),
        )
        // 购物车
        .route(
            "/cart",
            get(handlers::cart::get_cart)
                .post(handlers::cart::add_to_cart)
                .delete(handlers::cart::clear_cart),
        )
        .route(
            "/cart/{product_id}",
            put(handlers::cart::update_cart_item).delete(handlers::cart::remove_cart_item),
        )
        // 收藏夹
        .route(
            "/wishlist",
            get(handlers::wishlist::list_wishlist).post(handlers::wishlist::add_to_wishlist),
        )
        .route(
            "/wishlist/{product_id}",
            delete(handlers::wishlist::remove_from_wishlist),
        )
        // 评价
        .route(
            "/products/{id}/reviews",
            post(handlers::review::create_review),
        )
        // 站内通知
        .route(
            "/notifications",
            get(handlers::notification::list_notifications),
        )
        .route(
            "/notifications/read-all",
            put(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/{id}/read",
            put(handlers::notification::mark_read),
        )
}

/// 管理员路由，挂在 `/admin` 下
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(handlers::admin::create_product))
        .route(
            "/products/{id}",
            put(handlers::admin::update_product).delete(handlers::admin::delete_product),
        )
        .route(
            "/products/{id}/images",
            post(handlers::admin::add_product_image),
        )
        .route(
            "/products/{id}/images/{image_id}/primary",
            put(handlers::admin::set_primary_image),
        )
        .route(
            "/products/{id}/images/{image_id}",
            delete(handlers::admin::delete_product_image),
        )
        .route(
            "/reviews/{id}/moderation",
            put(handlers::admin::moderate_review),
        )
        .route("/notifications", post(handlers::admin::send_notification))
}

/// 组装 `/api` 下的全部路由
///
/// 认证层最后添加、最先执行；管理员路由在认证之后再做角色检查
pub fn api_routes(jwt: JwtManager) -> Router<AppState> {
    let protected = protected_routes()
        .route_layer(middleware::from_fn_with_state(jwt.clone(), auth_middleware));

    let admin = admin_routes()
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(jwt, auth_middleware));

    Router::new()
        .merge(public_routes())
        .merge(protected)
        .nest("/admin", admin)
}

/// 构建完整应用
pub fn app(state: AppState, server: &ServerConfig) -> Router {
    let router = Router::new()
        .nest("/api", api_routes(state.jwt.clone()))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .with_state(state);

    with_http_layers(router, server)
}
