//! 赊账与促销轮播集成测试

mod common;

use common::{TestApp, approx, enc};
use http::{Method, StatusCode};
use serde_json::{Value, json};

async fn create_customer(app: &TestApp, token: &str, name: &str) -> String {
    let (status, body) = app
        .post(
            "/api/credits/customers",
            token,
            json!({ "name": name, "phone": "555-0101" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(approx(body["total_credit"].as_f64().unwrap(), 0.0));
    body["id"].as_str().unwrap().to_string()
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_credit_order_and_payments() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let milk = app.create_stock(&token, "Milk", 10.0).await;
    let latte = app
        .create_product(
            &token,
            "Latte",
            4.0,
            1.5,
            json!([{ "stock_id": milk, "quantity_per_unit": 0.25 }]),
        )
        .await;
    let customer = create_customer(&app, &token, "Maria").await;

    // 同名客户 -> 409
    let (status, _) = app
        .post("/api/credits/customers", &token, json!({ "name": " Maria " }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, order) = app
        .post(
            "/api/credits/orders",
            &token,
            json!({
                "customerId": customer,
                "order_type": "dine-in",
                "table_id": 3,
                "items": [{ "product_id": latte, "quantity": 5 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{order}");
    assert!(approx(order["total"].as_f64().unwrap(), 20.0));
    assert!(approx(order["remaining_balance"].as_f64().unwrap(), 20.0));
    assert_eq!(order["status"], "pending");
    assert_eq!(order["customer_name"], "Maria");
    assert!(order["order_number"].as_str().unwrap().starts_with("CREDIT-"));
    let order_id = id_of(&order);

    // 扣库存但不占桌
    assert!(approx(app.stock_quantity(&token, &milk).await, 8.75));
    assert_eq!(app.table_status(&token, 3).await["status"], "free");

    let payments = format!("/api/credits/orders/{}/payments", enc(&order_id));

    // 超额和非正数付款均拒绝
    for amount in [25.0, 0.0, -1.0] {
        let (status, _) = app
            .post(&payments, &token, json!({ "amount": amount }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "amount {amount}");
    }

    let (status, receipt) = app
        .post(
            &payments,
            &token,
            json!({ "amount": 7.5, "paymentMethod": "card", "notes": "first" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{receipt}");
    assert_eq!(receipt["order"]["status"], "partial");
    assert!(approx(receipt["order"]["remaining_balance"].as_f64().unwrap(), 12.5));
    assert_eq!(receipt["payment"]["payment_method"], "card");

    let (status, receipt) = app
        .post(&payments, &token, json!({ "amount": 12.5 }))
        .await;
    assert_eq!(status, StatusCode::OK, "{receipt}");
    assert_eq!(receipt["order"]["status"], "paid");
    assert!(approx(receipt["order"]["amount_paid"].as_f64().unwrap(), 20.0));

    // 已结清后不能再付
    let (status, _) = app
        .post(&payments, &token, json!({ "amount": 1.0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, detail) = app
        .get(&format!("/api/credits/orders/{}", enc(&order_id)), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["payments"].as_array().unwrap().len(), 2);

    let (status, summary) = app
        .get(
            &format!("/api/credits/customers/{}/summary", enc(&customer)),
            &token,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{summary}");
    assert_eq!(summary["total_orders"], 1);
    assert_eq!(summary["paid_orders"], 1);
    assert!(approx(summary["customer"]["total_credit"].as_f64().unwrap(), 0.0));
}

#[tokio::test]
async fn test_credit_order_filters_and_balance() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let espresso = app
        .create_product(&token, "Espresso", 2.0, 0.5, json!([]))
        .await;
    let ana = create_customer(&app, &token, "Ana").await;
    let luis = create_customer(&app, &token, "Luis").await;

    for (customer, qty) in [(&ana, 2), (&ana, 3), (&luis, 1)] {
        let (status, body) = app
            .post(
                "/api/credits/orders",
                &token,
                json!({ "customer_id": customer, "order_type": "to-go", "items": [{ "product_id": espresso, "quantity": qty }] }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    let (status, customers) = app.get("/api/credits/customers", &token).await;
    assert_eq!(status, StatusCode::OK);
    let ana_row = customers
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Ana")
        .cloned()
        .unwrap();
    assert!(approx(ana_row["total_credit"].as_f64().unwrap(), 10.0));
    assert!(ana_row["last_transaction"].is_number());

    let (status, orders) = app
        .get(
            &format!("/api/credits/orders?customerId={}", enc(&ana)),
            &token,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{orders}");
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["customer"]["name"], "Ana");

    let (status, pending) = app.get("/api/credits/orders?status=pending", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending.as_array().unwrap().len(), 3);

    // 员工餐不能赊账
    let (status, _) = app
        .post(
            "/api/credits/orders",
            &token,
            json!({ "customer_id": luis, "order_type": "employee", "items": [{ "product_id": espresso }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/credits/orders",
            &token,
            json!({ "customer_id": "credit_customer:ghost", "items": [{ "product_id": espresso }] }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_promo_slides() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let (status, live) = app
        .post(
            "/api/promos",
            &admin,
            json!({ "title": "Happy hour", "image": "/img/happy.png" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{live}");
    assert_eq!(live["active"], true);

    let (status, _) = app
        .post(
            "/api/promos",
            &admin,
            json!({ "title": "Old deal", "image": "/img/old.png", "expiryDate": "2020-01-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post(
            "/api/promos",
            &admin,
            json!({ "title": "Hidden", "image": "/img/hidden.png", "active": false }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, all) = app.get("/api/promos", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);

    // 顾客端只看到启用且未过期的
    let (status, visible) = app
        .send(Method::GET, "/api/client/promos", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let visible = visible.as_array().unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0]["title"], "Happy hour");

    let live_id = id_of(&live);
    let (status, updated) = app
        .put(
            &format!("/api/promos/{}", enc(&live_id)),
            &admin,
            json!({ "active": false }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["active"], false);
    assert_eq!(updated["title"], "Happy hour");

    let (_, visible) = app
        .send(Method::GET, "/api/client/promos", None, None)
        .await;
    assert!(visible.as_array().unwrap().is_empty());

    let (status, _) = app
        .delete(&format!("/api/promos/{}", enc(&live_id)), &admin)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .delete(&format!("/api/promos/{}", enc(&live_id)), &admin)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post("/api/promos", &admin, json!({ "title": "No image" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payments_always_match_settlement() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let espresso = app
        .create_product(&token, "Espresso", 2.5, 0.5, json!([]))
        .await;
    let customer = create_customer(&app, &token, "Rosa").await;

    let (status, order) = app
        .post(
            "/api/credits/orders",
            &token,
            json!({ "customer_id": customer, "order_type": "to-go", "items": [{ "product_id": espresso, "quantity": 4 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{order}");
    let order_path = format!("/api/credits/orders/{}", enc(&id_of(&order)));
    let payments = format!("{}/payments", order_path);

    // 被拒的付款不留下记录
    for (amount, expected) in [
        (3.3, StatusCode::OK),
        (50.0, StatusCode::BAD_REQUEST),
        (2.2, StatusCode::OK),
        (-2.0, StatusCode::BAD_REQUEST),
        (4.5, StatusCode::OK),
        (0.01, StatusCode::BAD_REQUEST),
    ] {
        let (status, _) = app
            .post(&payments, &token, json!({ "amount": amount }))
            .await;
        assert_eq!(status, expected, "amount {amount}");

        let (_, detail) = app.get(&order_path, &token).await;
        let recorded: f64 = detail["payments"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["amount"].as_f64().unwrap())
            .sum();
        let paid = detail["order"]["amount_paid"].as_f64().unwrap();
        assert!(approx(recorded, paid), "recorded {recorded} vs paid {paid}");
        assert!(approx(
            paid + detail["order"]["remaining_balance"].as_f64().unwrap(),
            10.0
        ));
    }

    let (_, detail) = app.get(&order_path, &token).await;
    assert_eq!(detail["order"]["status"], "paid");
    assert_eq!(detail["payments"].as_array().unwrap().len(), 3);

    let (_, summary) = app
        .get(
            &format!("/api/credits/customers/{}/summary", enc(&customer)),
            &token,
        )
        .await;
    assert!(approx(summary["customer"]["total_credit"].as_f64().unwrap(), 0.0));
}
