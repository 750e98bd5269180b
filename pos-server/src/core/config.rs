use std::path::PathBuf;

use chrono_tz::Tz;

use crate::auth::JwtConfig;
use crate::core::ServerError;
use crate::utils::time::parse_timezone;

/// 默认管理员 (首次启动时创建)
#[derive(Debug, Clone)]
pub struct DefaultAdmin {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | DB_NAMESPACE | simplepos | SurrealDB namespace |
/// | DB_NAME | pos | SurrealDB database |
/// | TIMEZONE | UTC | 业务时区 (IANA) |
/// | TABLE_COUNT | 16 | 启动时初始化的桌台数 |
/// | DEFAULT_ADMIN_EMAIL | admin@simplepos.local | 默认管理员邮箱 |
/// | DEFAULT_ADMIN_PASSWORD | admin1234 | 默认管理员密码 |
/// | DEFAULT_ADMIN_NAME | Admin | 默认管理员名称 |
/// | ALLOW_NEGATIVE_STOCK | true | 是否允许库存为负 |
/// | CORS_ORIGINS | (空) | 允许的来源，逗号分隔 |
/// | STATIC_DIR | (无) | 前端静态文件目录 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (无) | 日志文件目录 |
/// | LOG_FORMAT | text | text / json |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/pos HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | production
    pub environment: String,
    pub db_namespace: String,
    pub db_name: String,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 业务时区，用于"今天"等日期边界
    pub timezone: Tz,
    pub table_count: u32,
    pub default_admin: DefaultAdmin,
    /// false 时拒绝会导致库存为负的扣减
    pub allow_negative_stock: bool,
    pub cors_origins: Vec<String>,
    pub static_dir: Option<String>,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 未设置的项使用默认值；时区或 JWT 密钥无效时返回错误
    pub fn from_env() -> Result<Self, ServerError> {
        let timezone = parse_timezone(&env_or("TIMEZONE", "UTC")).map_err(ServerError::Config)?;

        Ok(Self {
            work_dir: env_or("WORK_DIR", "./data"),
            http_port: env_parse("HTTP_PORT", 3000),
            environment: env_or("ENVIRONMENT", "development"),
            db_namespace: env_or("DB_NAMESPACE", "simplepos"),
            db_name: env_or("DB_NAME", "pos"),
            jwt: JwtConfig::from_env()?,
            timezone,
            table_count: env_parse("TABLE_COUNT", 16),
            default_admin: DefaultAdmin {
                email: env_or("DEFAULT_ADMIN_EMAIL", "admin@simplepos.local"),
                password: env_or("DEFAULT_ADMIN_PASSWORD", "admin1234"),
                name: env_or("DEFAULT_ADMIN_NAME", "Admin"),
            },
            allow_negative_stock: env_parse("ALLOW_NEGATIVE_STOCK", true),
            cors_origins: env_opt("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            static_dir: env_opt("STATIC_DIR"),
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS", 30000),
            log_level: env_or("LOG_LEVEL", "info"),
            log_dir: env_opt("LOG_DIR"),
            log_json: env_or("LOG_FORMAT", "text").eq_ignore_ascii_case("json"),
        })
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(
        work_dir: impl Into<String>,
        http_port: u16,
    ) -> Result<Self, ServerError> {
        let mut config = Self::from_env()?;
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        Ok(config)
    }

    /// 数据库目录: work_dir/database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 数据库路径: work_dir/database/pos.db
    pub fn database_path(&self) -> PathBuf {
        self.database_dir().join("pos.db")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
