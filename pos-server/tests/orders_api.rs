//! 订单生命周期集成测试: 库存扣减/回补、桌台占用、汇总与导出

mod common;

use std::sync::Arc;

use common::{TestApp, approx, enc};
use http::{Method, StatusCode, header};
use serde_json::{Value, json};

struct Menu {
    milk: String,
    latte: String,
    espresso: String,
}

/// 牛奶 10L；拿铁 3.50 (成本 1.20, 每杯 0.2L 牛奶)；浓缩 2.00 (成本 0.50, 无配方)
async fn setup_menu(app: &TestApp, token: &str) -> Menu {
    let milk = app.create_stock(token, "Milk", 10.0).await;
    let latte = app
        .create_product(
            token,
            "Latte",
            3.5,
            1.2,
            json!([{ "stock_id": milk, "quantity_per_unit": 0.2 }]),
        )
        .await;
    let espresso = app
        .create_product(token, "Espresso", 2.0, 0.5, json!([]))
        .await;
    Menu {
        milk,
        latte,
        espresso,
    }
}

fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

fn order_id(order: &Value) -> String {
    order["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_dine_in_order_lifecycle() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let menu = setup_menu(&app, &token).await;

    let (status, order) = app
        .post(
            "/api/orders",
            &token,
            json!({
                "table_id": 1,
                "order_type": "dine-in",
                "items": [
                    { "product_id": menu.latte, "quantity": 2 },
                    { "product_id": menu.espresso }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{order}");
    assert!(approx(order["total"].as_f64().unwrap(), 9.0));
    assert!(approx(order["base_total"].as_f64().unwrap(), 2.9));
    assert_eq!(order["status"], "pending");
    assert_eq!(order["table_id"], "dining_table:1");
    let id = order_id(&order);

    // 2 杯拿铁消耗 0.4L
    assert!(approx(app.stock_quantity(&token, &menu.milk).await, 9.6));

    let table = app.table_status(&token, 1).await;
    assert_eq!(table["status"], "occupied");
    assert_eq!(table["current_order"], id.as_str());

    let (status, held) = app.get("/api/orders/table/1", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(held["id"], id.as_str());

    // 同桌再下单 -> 409
    let (status, _) = app
        .post(
            "/api/orders",
            &token,
            json!({ "table_id": "dining_table:1", "items": [{ "product_id": menu.espresso }] }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // 付款后释放桌台，库存不变
    let (status, paid) = app
        .put(
            &format!("/api/orders/{}/status", enc(&id)),
            &token,
            json!({ "status": "paid" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{paid}");
    assert_eq!(paid["status"], "paid");
    assert_eq!(app.table_status(&token, 1).await["status"], "free");
    assert!(approx(app.stock_quantity(&token, &menu.milk).await, 9.6));

    let (status, held) = app.get("/api/orders/table/1", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(held.is_null());

    // 取消后回补库存
    let (status, _) = app
        .put(
            &format!("/api/orders/{}/status", enc(&id)),
            &token,
            json!({ "status": "cancelled" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(app.stock_quantity(&token, &menu.milk).await, 10.0));

    // 已取消订单不能修改商品
    let (status, _) = app
        .put(
            &format!("/api/orders/{}/items", enc(&id)),
            &token,
            json!({ "items": [{ "product_id": menu.latte }] }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_items_moves_stock_by_difference() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let menu = setup_menu(&app, &token).await;

    let (status, order) = app
        .post(
            "/api/orders",
            &token,
            json!({ "order_type": "to-go", "items": [{ "product_id": menu.latte, "quantity": 1 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{order}");
    assert!(order["table_id"].is_null());
    assert!(approx(app.stock_quantity(&token, &menu.milk).await, 9.8));

    let (status, updated) = app
        .put(
            &format!("/api/orders/{}/items", enc(&order_id(&order))),
            &token,
            json!({ "items": [{ "product_id": menu.latte, "quantity": 3 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert!(approx(updated["total"].as_f64().unwrap(), 10.5));
    assert!(approx(app.stock_quantity(&token, &menu.milk).await, 9.4));

    // 删除订单全部回补
    let (status, _) = app
        .delete(&format!("/api/orders/{}", enc(&order_id(&order))), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(app.stock_quantity(&token, &menu.milk).await, 10.0));

    let (status, _) = app
        .get(&format!("/api/orders/{}", enc(&order_id(&order))), &token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_validation() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let menu = setup_menu(&app, &token).await;

    let (status, _) = app
        .post("/api/orders", &token, json!({ "items": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/orders",
            &token,
            json!({ "items": [{ "product_id": "product:missing" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(
            "/api/orders",
            &token,
            json!({ "table_id": 99, "items": [{ "product_id": menu.espresso }] }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(
            "/api/orders",
            &token,
            json!({ "items": [{ "product_id": menu.espresso, "price": -1.0 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_negative_stock_rejected_when_disabled() {
    let app = TestApp::spawn_with(false).await;
    let token = app.admin_token().await;
    let menu = setup_menu(&app, &token).await;

    // 60 杯需要 12L，库存只有 10L
    let (status, body) = app
        .post(
            "/api/orders",
            &token,
            json!({ "order_type": "to-go", "items": [{ "product_id": menu.latte, "quantity": 60 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert!(approx(app.stock_quantity(&token, &menu.milk).await, 10.0));

    let (_, orders) = app.get("/api/orders/today", &token).await;
    assert!(orders.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_client_order_waits_for_confirmation() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let menu = setup_menu(&app, &token).await;

    // 顾客端价格取自目录，忽略客户端传入的价格
    let (status, order) = app
        .send(
            Method::POST,
            "/api/client/order",
            None,
            Some(json!({
                "tableNumber": 2,
                "items": [{ "id": menu.latte, "price": 0.01, "quantity": 1 }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["source"], "client");
    assert_eq!(order["status"], "pending");
    assert!(approx(order["total"].as_f64().unwrap(), 3.5));
    assert!(order["order_number"].as_str().unwrap().starts_with("T2-"));

    // pending 状态不扣库存、不占桌
    assert!(approx(app.stock_quantity(&token, &menu.milk).await, 10.0));
    assert_eq!(app.table_status(&token, 2).await["status"], "free");

    let (status, _) = app
        .put(
            &format!("/api/orders/{}/status", enc(&order_id(&order))),
            &token,
            json!({ "status": "confirmed" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(app.stock_quantity(&token, &menu.milk).await, 9.8));
    assert_eq!(app.table_status(&token, 2).await["status"], "occupied");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/client/order",
            None,
            Some(json!({ "tableNumber": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_daily_summary_and_export() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let menu = setup_menu(&app, &token).await;

    for body in [
        json!({ "order_type": "to-go", "status": "paid", "items": [{ "product_id": menu.latte, "quantity": 2 }] }),
        json!({ "order_type": "to-go", "status": "paid", "items": [{ "product_id": menu.espresso }] }),
        json!({ "order_type": "employee", "items": [{ "product_id": menu.espresso }] }),
        json!({ "order_type": "to-go", "status": "cancelled", "items": [{ "product_id": menu.latte }] }),
    ] {
        let (status, order) = app.post("/api/orders", &token, body).await;
        assert_eq!(status, StatusCode::OK, "{order}");
    }

    let date = today();
    let (status, orders) = app.get(&format!("/api/orders/date/{}", date), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 4);

    let (status, summary) = app
        .get(&format!("/api/orders/summary/{}", date), &token)
        .await;
    assert_eq!(status, StatusCode::OK, "{summary}");
    assert_eq!(summary["totals"]["total_orders"], 3);
    // 员工餐只计成本
    assert!(approx(summary["totals"]["total_revenue"].as_f64().unwrap(), 9.0));
    assert!(approx(summary["totals"]["total_cost"].as_f64().unwrap(), 3.4));
    let products = summary["products"].as_array().unwrap();
    assert_eq!(products.len(), 2);

    let (status, headers, body) = app
        .raw(
            Method::POST,
            "/api/orders/export",
            Some(&token),
            Some(json!({ "startDate": date, "endDate": date })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.contains(&format!("sales_{}_to_{}.csv", date, date)));

    let csv = String::from_utf8(body).unwrap();
    // 表头 + 4 个订单共 4 行商品
    assert_eq!(csv.lines().count(), 5);

    let (status, _) = app.get("/api/orders/date/not-a-date", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_dine_in_order_frees_table() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let menu = setup_menu(&app, &token).await;

    let (status, order) = app
        .post(
            "/api/orders",
            &token,
            json!({ "table_id": 3, "order_type": "dine-in", "items": [{ "product_id": menu.latte }] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{order}");
    assert_eq!(app.table_status(&token, 3).await["status"], "occupied");

    let (status, _) = app
        .delete(&format!("/api/orders/{}", enc(&order_id(&order))), &token)
        .await;
    assert_eq!(status, StatusCode::OK);

    let table = app.table_status(&token, 3).await;
    assert_eq!(table["status"], "free");
    assert!(table["current_order"].is_null());
    assert!(approx(app.stock_quantity(&token, &menu.milk).await, 10.0));

    // 桌台可再次下单
    let (status, _) = app
        .post(
            "/api/orders",
            &token,
            json!({ "table_id": 3, "items": [{ "product_id": menu.espresso }] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_confirming_client_order_on_held_table_conflicts() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let menu = setup_menu(&app, &token).await;

    let (status, client) = app
        .send(
            Method::POST,
            "/api/client/order",
            None,
            Some(json!({ "tableNumber": 1, "items": [{ "id": menu.latte, "quantity": 1 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{client}");

    // 顾客单 pending 不占桌, 收银员可以先占用
    let (status, cashier) = app
        .post(
            "/api/orders",
            &token,
            json!({ "table_id": 1, "items": [{ "product_id": menu.espresso }] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{cashier}");

    let (status, body) = app
        .put(
            &format!("/api/orders/{}/status", enc(&order_id(&client))),
            &token,
            json!({ "status": "confirmed" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["details"]["table_number"], 1);

    // 失败时不扣库存, 状态不变
    assert!(approx(app.stock_quantity(&token, &menu.milk).await, 10.0));
    let (_, unchanged) = app
        .get(&format!("/api/orders/{}", enc(&order_id(&client))), &token)
        .await;
    assert_eq!(unchanged["status"], "pending");
    assert_eq!(
        app.table_status(&token, 1).await["current_order"],
        order_id(&cashier).as_str()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_orders_are_serialised() {
    const ATTEMPTS: usize = 20;

    let app = Arc::new(TestApp::spawn().await);
    let token = app.admin_token().await;
    let menu = setup_menu(&app, &token).await;

    // 同一张桌同时下单: 只有一单成功
    let mut handles = Vec::with_capacity(ATTEMPTS);
    for _ in 0..ATTEMPTS {
        let app = app.clone();
        let token = token.clone();
        let latte = menu.latte.clone();
        handles.push(tokio::spawn(async move {
            app.post(
                "/api/orders",
                &token,
                json!({ "table_id": 4, "order_type": "dine-in", "items": [{ "product_id": latte }] }),
            )
            .await
            .0
        }));
    }

    let mut ok = 0;
    let mut conflict = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::OK => ok += 1,
            StatusCode::CONFLICT => conflict += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(conflict, ATTEMPTS - 1);
    assert!(approx(app.stock_quantity(&token, &menu.milk).await, 9.8));

    // 外带单并发扣同一库存: 不丢更新、无浮点残差
    let mut handles = Vec::with_capacity(ATTEMPTS);
    for _ in 0..ATTEMPTS {
        let app = app.clone();
        let token = token.clone();
        let latte = menu.latte.clone();
        handles.push(tokio::spawn(async move {
            app.post(
                "/api/orders",
                &token,
                json!({ "order_type": "to-go", "items": [{ "product_id": latte }] }),
            )
            .await
            .0
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }
    // 9.8 - 20 x 0.2
    assert_eq!(app.stock_quantity(&token, &menu.milk).await, 5.8);

    let (_, movements) = app
        .get(&format!("/api/stock/{}/movements", enc(&menu.milk)), &token)
        .await;
    assert_eq!(movements.as_array().unwrap().len(), ATTEMPTS + 1);
}
