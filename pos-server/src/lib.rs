//! SimplePOS Server - 咖啡店收银后台
//!
//! # 架构概述
//!
//! 单节点 REST 服务，提供以下核心功能：
//!
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **认证** (`auth`): JWT + Argon2 认证体系
//! - **订单** (`orders`): 订单生命周期、桌台占用
//! - **库存** (`inventory`): 库存扣减/回补与流水
//! - **赊账** (`credits`): 赊账订单与还款
//! - **报表** (`reports`): 日报、损益、CSV 导出
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! pos-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── auth/          # JWT 认证、中间件
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 模型、仓储、schema、种子数据
//! ├── orders/        # 订单服务、金额、编号
//! ├── inventory/     # 库存账本
//! ├── credits/       # 赊账服务
//! ├── reports/       # 汇总与导出
//! └── utils/         # 错误、日志、时间、校验
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod credits;
pub mod db;
pub mod inventory;
pub mod orders;
pub mod reports;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use credits::CreditService;
pub use inventory::StockLedger;
pub use orders::OrderService;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
   _____ _                 __     ____  ____  _____
  / ___/(_)___ ___  ____  / /__  / __ \/ __ \/ ___/
  \__ \/ / __ `__ \/ __ \/ / _ \/ /_/ / / / /\__ \
 ___/ / / / / / / / /_/ / /  __/ ____/ /_/ /___/ /
/____/_/_/ /_/ /_/ .___/_/\___/_/    \____//____/
                /_/
    "#
    );
}

/// 加载 `.env` 并初始化日志
///
/// 日志配置直接读取环境变量，保证在 [`Config::from_env`] 失败时也能输出错误。
pub fn setup_environment() {
    // .env 可选
    let _ = dotenv::dotenv();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), json, log_dir.as_deref());
}
