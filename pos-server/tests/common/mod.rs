//! 集成测试公共工具
//!
//! 每个测试使用独立的临时工作目录和数据库，通过 `tower::ServiceExt::oneshot`
//! 直接驱动完整的 Router (含认证中间件)。

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use pos_server::auth::JwtConfig;
use pos_server::core::config::DefaultAdmin;
use pos_server::{Config, ServerState};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@test.local";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const TABLE_COUNT: u32 = 4;

pub struct TestApp {
    pub router: Router,
    pub state: ServerState,
    _work_dir: TempDir,
}

pub fn test_config(work_dir: &str, allow_negative_stock: bool) -> Config {
    Config {
        work_dir: work_dir.to_string(),
        http_port: 0,
        environment: "development".into(),
        db_namespace: "test".into(),
        db_name: "test".into(),
        jwt: JwtConfig::with_secret("integration-test-secret-0123456789abcdef"),
        timezone: chrono_tz::Tz::UTC,
        table_count: TABLE_COUNT,
        default_admin: DefaultAdmin {
            email: ADMIN_EMAIL.into(),
            password: ADMIN_PASSWORD.into(),
            name: "Admin".into(),
        },
        allow_negative_stock,
        cors_origins: Vec::new(),
        static_dir: None,
        request_timeout_ms: 30_000,
        log_level: "warn".into(),
        log_dir: None,
        log_json: false,
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(true).await
    }

    pub async fn spawn_with(allow_negative_stock: bool) -> Self {
        let work_dir = tempfile::tempdir().unwrap();
        let config = test_config(&work_dir.path().to_string_lossy(), allow_negative_stock);
        let state = ServerState::initialize(&config).await.unwrap();
        let router = pos_server::api::build_app(state.clone());
        Self {
            router,
            state,
            _work_dir: work_dir,
        }
    }

    /// 发送请求，返回状态码和原始 body
    pub async fn raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, http::HeaderMap, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, bytes.to_vec())
    }

    /// 发送请求，body 按 JSON 解析 (空 body 为 Null)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, _, bytes) = self.raw(method, uri, token, body).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// 创建库存项，返回 id
    pub async fn create_stock(&self, token: &str, name: &str, quantity: f64) -> String {
        let (status, body) = self
            .post(
                "/api/stock",
                token,
                json!({
                    "name": name,
                    "category": "dairy",
                    "unit": "l",
                    "current_quantity": quantity,
                    "minimum_quantity": 1.0,
                    "cost_per_unit": 2.0
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create stock failed: {body}");
        body["id"].as_str().unwrap().to_string()
    }

    /// 创建商品，返回 id
    pub async fn create_product(
        &self,
        token: &str,
        name: &str,
        price: f64,
        base_price: f64,
        stock_items: Value,
    ) -> String {
        let (status, body) = self
            .post(
                "/api/products",
                token,
                json!({
                    "name": name,
                    "price": price,
                    "base_price": base_price,
                    "category": "coffee",
                    "stock_items": stock_items
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create product failed: {body}");
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn stock_quantity(&self, token: &str, stock_id: &str) -> f64 {
        let (status, body) = self.get(&format!("/api/stock/{}", enc(stock_id)), token).await;
        assert_eq!(status, StatusCode::OK, "get stock failed: {body}");
        body["current_quantity"].as_f64().unwrap()
    }

    pub async fn table_status(&self, token: &str, number: u32) -> Value {
        let (status, body) = self.get("/api/orders/tables", token).await;
        assert_eq!(status, StatusCode::OK);
        body.as_array()
            .unwrap()
            .iter()
            .find(|t| t["table_number"] == number)
            .cloned()
            .unwrap()
    }
}

/// 记录 id 放入 URL 路径前做百分号编码 (id 可能含 `⟨⟩`)
pub fn enc(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for b in id.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b':' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

/// 浮点比较
pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}
