//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 登录、令牌校验、修改密码
//! - [`users`] - 用户管理 (管理员)
//! - [`products`] - 商品管理
//! - [`orders`] - 订单、桌台、日报和导出
//! - [`stock`] - 库存和库存流水
//! - [`expenses`] - 支出和损益
//! - [`credits`] - 赊账客户、赊账订单、还款
//! - [`promos`] - 促销轮播 (管理员)
//! - [`client`] - 顾客自助点餐 (无需认证)

pub mod auth;
pub mod client;
pub mod credits;
pub mod expenses;
pub mod health;
pub mod orders;
pub mod products;
pub mod promos;
pub mod stock;
pub mod users;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use axum::{Router, middleware};
use http::header::{HeaderName, HeaderValue};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::{Config, ServerState};

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// uuid v4 request id
#[derive(Clone, Copy, Default)]
struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&uuid::Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        target: "http_access",
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        request_id = %request_id,
        "{} {} {}",
        method,
        path,
        response.status()
    );

    response
}

/// Build the Axum router (without state)
pub fn build_router() -> Router<ServerState> {
    Router::<ServerState>::new()
        // Core APIs
        .merge(health::router())
        .merge(auth::router())
        .merge(users::router())
        // Catalogue & inventory
        .merge(products::router())
        .merge(stock::router())
        // Sales
        .merge(orders::router())
        .merge(credits::router())
        .merge(expenses::router())
        // Customer-facing
        .merge(promos::router())
        .merge(client::router())
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_origins.is_empty() {
        if config.is_production() {
            tracing::warn!("CORS_ORIGINS is empty in production; allowing any origin");
        }
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the complete application: routes, auth, static frontend and tower-http stack
pub fn build_app(state: ServerState) -> Router {
    let config = state.config.clone();
    let mut router = build_router();

    // 前端静态文件 (SPA: 未匹配的路径回退到 index.html)
    if let Some(dir) = &config.static_dir {
        let index = PathBuf::from(dir).join("index.html");
        router = router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
        tracing::info!(static_dir = %dir, "Serving frontend");
    }

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    router
        // JWT 认证中间件 - require_auth 内部会跳过公共路由和非 /api 路径
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        // Security headers
        .layer(SetResponseHeaderLayer::if_not_present(
            http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            http::header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            http::header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(TimeoutLayer::new(Duration::from_millis(config.request_timeout_ms)))
        .layer(cors_layer(&config))
        .layer(CompressionLayer::new())
        // HTTP 请求日志中间件
        .layer(middleware::from_fn(log_request))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), UuidRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
}
