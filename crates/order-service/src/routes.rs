//! 路由配置模块

use axum::{
    Router,
    middleware,
    routing::{get, post, put},
};
use easybuy_shared::auth::JwtManager;
use easybuy_shared::config::ServerConfig;
use easybuy_shared::middleware::{auth_middleware, require_admin};
use easybuy_shared::server::with_http_layers;

use crate::{handlers, state::AppState};

/// 公开路由：优惠券浏览与试算
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/vouchers", get(handlers::voucher::list_vouchers))
        .route("/vouchers/validate", post(handlers::voucher::validate_voucher))
}

/// 需要登录的路由
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/orders",
            get(handlers::order::list_orders).post(handlers::order::place_order),
        )
        .route("/orders/{id}", get(handlers::order::get_order))
        .route("/orders/{id}/cancel", put(handlers::order::cancel_order))
}

/// 管理员路由，挂在 `/admin` 下
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(handlers::admin::list_orders))
        .route("/orders/{id}", get(handlers::admin::get_order))
        .route(
            "/orders/{id}/status",
            put(handlers::admin::update_order_status),
        )
        .route("/vouchers", post(handlers::admin::create_voucher))
        .route(
            "/vouchers/{id}",
            put(handlers::admin::update_voucher).delete(handlers::admin::delete_voucher),
        )
}

/// 组装 `/api` 下的全部路由
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
