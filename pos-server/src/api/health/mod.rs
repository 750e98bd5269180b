//! 健康检查路由
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/health | GET | 服务与数据库状态 | 无 |
//!
//! # 响应示例
//!
//! ```json
//! {
//!   "status": "ok",
//!   "timestamp": "2024-03-15T09:30:00+00:00",
//!   "environment": "development",
//!   "database": "connected",
//!   "version": "0.1.0",
//!   "uptime_seconds": 42
//! }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;

/// 健康检查路由 - 公共路由 (无需认证)
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

/// 健康检查响应
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// 状态 (ok | degraded)
    pub status: String,
    pub timestamp: String,
    pub environment: String,
    /// connected | disconnected
    pub database: String,
    pub version: String,
    /// 运行时间 (秒)
    pub uptime_seconds: u64,
}

/// GET /api/health - 健康检查
pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let db_ok = match state.db.health().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            false
        }
    };

    Json(HealthResponse {
        status: if db_ok { "ok" } else { "degraded" }.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        environment: state.config.environment.clone(),
        database: if db_ok { "connected" } else { "disconnected" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}
