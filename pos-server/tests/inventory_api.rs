//! 库存、商品、支出集成测试

mod common;

use std::sync::Arc;

use common::{TestApp, approx, enc};
use http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_stock_adjust_and_movements() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let beans = app.create_stock(&token, "Coffee beans", 5.0).await;
    let path = format!("/api/stock/{}", enc(&beans));

    let (status, body) = app
        .post(
            &format!("{}/adjust", path),
            &token,
            json!({ "quantity": 2.5, "type": "purchase" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(approx(body["stock"]["current_quantity"].as_f64().unwrap(), 7.5));
    assert_eq!(body["movement"]["type"], "purchase");

    let (status, body) = app
        .post(
            &format!("{}/adjust", path),
            &token,
            json!({ "quantity": -1.0, "type": "loss", "referenceId": "spilled" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["movement"]["reference_type"], "manual");
    assert!(approx(app.stock_quantity(&token, &beans).await, 6.5));

    // 零数量和缺少 reference_id 均拒绝
    let (status, _) = app
        .post(&format!("{}/adjust", path), &token, json!({ "quantity": 0.0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .post(
            &format!("{}/adjust", path),
            &token,
            json!({ "quantity": 1.0, "referenceType": "order" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // PUT 修改数量记为 adjustment
    let (status, body) = app
        .put(&path, &token, json!({ "current_quantity": 10.0, "name": "Beans" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["name"], "Beans");
    assert!(approx(body["current_quantity"].as_f64().unwrap(), 10.0));

    let (status, movements) = app.get(&format!("{}/movements", path), &token).await;
    assert_eq!(status, StatusCode::OK);
    let movements = movements.as_array().unwrap();
    assert_eq!(movements.len(), 3);
    let total: f64 = movements
        .iter()
        .map(|m| m["quantity"].as_f64().unwrap())
        .sum();
    assert!(approx(total, 5.0));

    let (status, _) = app.get("/api/stock/stock:missing", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_low_stock_alerts() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    // minimum_quantity 为 1.0
    let sugar = app.create_stock(&token, "Sugar", 0.5).await;
    app.create_stock(&token, "Milk", 8.0).await;

    let (status, low) = app.get("/api/stock/alerts/low", &token).await;
    assert_eq!(status, StatusCode::OK);
    let low = low.as_array().unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0]["id"], sugar.as_str());
}

#[tokio::test]
async fn test_negative_adjustment_rejected_when_disabled() {
    let app = TestApp::spawn_with(false).await;
    let token = app.admin_token().await;
    let milk = app.create_stock(&token, "Milk", 2.0).await;

    let (status, _) = app
        .post(
            &format!("/api/stock/{}/adjust", enc(&milk)),
            &token,
            json!({ "quantity": -5.0, "type": "loss" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(approx(app.stock_quantity(&token, &milk).await, 2.0));
}

#[tokio::test]
async fn test_product_recipe_references() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let milk = app.create_stock(&token, "Milk", 10.0).await;

    // 引用不存在的库存
    let (status, _) = app
        .post(
            "/api/products",
            &token,
            json!({
                "name": "Latte",
                "price": 3.5,
                "stock_items": [{ "stock_id": "stock:ghost", "quantity_per_unit": 0.2 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post("/api/products", &token, json!({ "name": "No price" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/api/products", &token, json!({ "name": "Bad", "price": -2.0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 裸 key 规范为 "stock:xxx"
    let bare_key = milk.trim_start_matches("stock:").to_string();
    let latte = app
        .create_product(
            &token,
            "Latte",
            3.456,
            1.2,
            json!([{ "stock_id": bare_key, "quantity_per_unit": 0.2 }]),
        )
        .await;

    let (status, product) = app
        .get(&format!("/api/products/{}", enc(&latte)), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(product["price"].as_f64().unwrap(), 3.46));
    assert_eq!(product["stock_items"][0]["stock_id"], milk.as_str());
    assert_eq!(product["stock_items"][0]["stock"]["name"], "Milk");

    // 被配方引用的库存不可删除
    let (status, body) = app
        .delete(&format!("/api/stock/{}", enc(&milk)), &token)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["products"][0], "Latte");

    let (status, updated) = app
        .put(
            &format!("/api/products/{}", enc(&latte)),
            &token,
            json!({ "price": 4.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert!(approx(updated["price"].as_f64().unwrap(), 4.0));
    assert_eq!(updated["name"], "Latte");

    let (status, _) = app
        .delete(&format!("/api/products/{}", enc(&latte)), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .delete(&format!("/api/products/{}", enc(&latte)), &token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .delete(&format!("/api/stock/{}", enc(&milk)), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_stock_expense_purchases_and_reverses() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let milk = app.create_stock(&token, "Milk", 4.0).await;

    let (status, expense) = app
        .post(
            "/api/expenses",
            &token,
            json!({
                "description": "Milk delivery",
                "amount": 12.0,
                "category": "stock",
                "stockId": milk,
                "quantity": 6.0
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{expense}");
    assert!(approx(app.stock_quantity(&token, &milk).await, 10.0));

    let (status, _) = app
        .post(
            "/api/expenses",
            &token,
            json!({ "description": "Rent", "amount": 300.0, "category": "rent" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, today) = app.get("/api/expenses/today", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(today["count"], 2);
    assert!(approx(today["total"].as_f64().unwrap(), 312.0));

    for period in ["week", "month"] {
        let (status, body) = app.get(&format!("/api/expenses/{}", period), &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
    }

    // 删除支出冲回采购
    let id = expense["id"].as_str().unwrap().to_string();
    let (status, _) = app
        .delete(&format!("/api/expenses/{}", enc(&id)), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(app.stock_quantity(&token, &milk).await, 4.0));

    let (status, all) = app.get("/api/expenses", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 1);

    let (status, _) = app
        .post(
            "/api/expenses",
            &token,
            json!({ "description": "Ghost", "amount": 1.0, "category": "stock", "stockId": "stock:ghost", "quantity": 1.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(
            "/api/expenses",
            &token,
            json!({ "description": "Negative", "amount": -1.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_daily_profit() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let espresso = app
        .create_product(&token, "Espresso", 2.0, 0.5, json!([]))
        .await;

    for status in ["paid", "pending"] {
        let (code, body) = app
            .post(
                "/api/orders",
                &token,
                json!({ "order_type": "to-go", "status": status, "items": [{ "product_id": espresso, "quantity": 5 }] }),
            )
            .await;
        assert_eq!(code, StatusCode::OK, "{body}");
    }
    let (status, _) = app
        .post(
            "/api/expenses",
            &token,
            json!({ "description": "Cleaning", "amount": 3.0, "category": "other" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let date = chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let (status, profit) = app
        .get(&format!("/api/expenses/summary/{}", date), &token)
        .await;
    assert_eq!(status, StatusCode::OK, "{profit}");
    // 只计已付款订单
    assert!(approx(profit["revenue"].as_f64().unwrap(), 10.0));
    assert!(approx(profit["cost_of_goods"].as_f64().unwrap(), 2.5));
    assert!(approx(profit["gross_profit"].as_f64().unwrap(), 7.5));
    assert!(approx(profit["expenses"].as_f64().unwrap(), 3.0));
    assert!(approx(profit["net_profit"].as_f64().unwrap(), 4.5));
    assert_eq!(profit["expense_breakdown"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_expense_category_edit_keeps_purchase_reversal() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let milk = app.create_stock(&token, "Milk", 10.0).await;

    // 非 stock 类支出带 stock_id 不入库, 改成 stock 后删除也不应扣库存
    let (status, note) = app
        .post(
            "/api/expenses",
            &token,
            json!({ "description": "Milk receipt", "amount": 8.0, "category": "other", "stockId": milk, "quantity": 4.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{note}");
    assert!(approx(app.stock_quantity(&token, &milk).await, 10.0));

    let note_path = format!("/api/expenses/{}", enc(note["id"].as_str().unwrap()));
    let (status, _) = app.put(&note_path, &token, json!({ "category": "stock" })).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.delete(&note_path, &token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(app.stock_quantity(&token, &milk).await, 10.0));

    // 真实采购改成 rent 后删除仍要冲回
    let (status, purchase) = app
        .post(
            "/api/expenses",
            &token,
            json!({ "description": "Milk delivery", "amount": 8.0, "category": "stock", "stockId": milk, "quantity": 4.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{purchase}");
    assert!(approx(app.stock_quantity(&token, &milk).await, 14.0));

    let purchase_path = format!("/api/expenses/{}", enc(purchase["id"].as_str().unwrap()));
    let (status, edited) = app
        .put(&purchase_path, &token, json!({ "category": "rent" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{edited}");
    assert_eq!(edited["category"], "rent");
    let (status, _) = app.delete(&purchase_path, &token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(app.stock_quantity(&token, &milk).await, 10.0));
}

#[tokio::test]
async fn test_stock_can_be_used_up_exactly() {
    let app = TestApp::spawn_with(false).await;
    let token = app.admin_token().await;
    let syrup = app.create_stock(&token, "Syrup", 0.3).await;
    let shot = app
        .create_product(
            &token,
            "Vanilla shot",
            0.5,
            0.1,
            json!([{ "stock_id": syrup, "quantity_per_unit": 0.1 }]),
        )
        .await;

    for _ in 0..3 {
        let (status, body) = app
            .post(
                "/api/orders",
                &token,
                json!({ "order_type": "to-go", "items": [{ "product_id": shot }] }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert!(app.stock_quantity(&token, &syrup).await >= 0.0);
    }
    // 不能有浮点残差
    assert_eq!(app.stock_quantity(&token, &syrup).await, 0.0);

    let (status, _) = app
        .post(
            "/api/orders",
            &token,
            json!({ "order_type": "to-go", "items": [{ "product_id": shot }] }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // 手动调整同样不留残差
    let path = format!("/api/stock/{}/adjust", enc(&syrup));
    for quantity in [0.1, 0.2] {
        let (status, _) = app
            .post(&path, &token, json!({ "quantity": quantity, "type": "purchase" }))
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(app.stock_quantity(&token, &syrup).await, 0.3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_stock_delete_races_recipe_writes() {
    const WRITERS: usize = 10;

    let app = Arc::new(TestApp::spawn().await);
    let token = app.admin_token().await;
    let milk = app.create_stock(&token, "Milk", 10.0).await;

    let mut writers = Vec::with_capacity(WRITERS);
    for i in 0..WRITERS {
        let app = app.clone();
        let token = token.clone();
        let milk = milk.clone();
        writers.push(tokio::spawn(async move {
            app.post(
                "/api/products",
                &token,
                json!({
                    "name": format!("Latte {i}"),
                    "price": 3.5,
                    "stock_items": [{ "stock_id": milk, "quantity_per_unit": 0.2 }]
                }),
            )
            .await
            .0
        }));
    }
    let deleter = {
        let app = app.clone();
        let token = token.clone();
        let path = format!("/api/stock/{}", enc(&milk));
        tokio::spawn(async move { app.delete(&path, &token).await.0 })
    };

    for writer in writers {
        let status = writer.await.unwrap();
        assert!(
            status == StatusCode::OK || status == StatusCode::NOT_FOUND,
            "unexpected status {status}"
        );
    }
    let deleted = deleter.await.unwrap();

    // 删除成功则不存在引用它的商品; 否则它仍存在
    let (_, products) = app.get("/api/products", &token).await;
    let products = products.as_array().unwrap();
    match deleted {
        StatusCode::OK => {
            assert!(products.is_empty(), "{products:?}");
            let (status, _) = app.get(&format!("/api/stock/{}", enc(&milk)), &token).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }
        StatusCode::CONFLICT => {
            assert!(!products.is_empty());
            for product in products {
                assert_eq!(product["stock_items"][0]["stock"]["name"], "Milk");
            }
        }
        other => panic!("unexpected delete status {other}"),
    }
}
