//! Sales CSV export (one row per order line)

use chrono_tz::Tz;
use csv::Writer;

use crate::db::models::Order;
use crate::orders::money::{to_decimal, to_f64};
use crate::utils::time::format_millis;

/// CSV header
pub const SALES_COLUMNS: [&str; 8] = [
    "order_number",
    "timestamp",
    "product_name",
    "quantity",
    "price",
    "base_price",
    "profit",
    "status",
];

/// Write `orders` as CSV; timestamps rendered as RFC 3339 in `tz`
pub fn write_sales_csv(orders: &[Order], tz: Tz) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = Writer::from_writer(Vec::new());

    wtr.write_record(SALES_COLUMNS)?;

    for order in orders {
        let timestamp = format_millis(order.timestamp, tz);
        for item in &order.items {
            let profit = (to_decimal(item.price) - to_decimal(item.base_price))
                * rust_decimal::Decimal::from(item.quantity);
            wtr.write_record(&[
                order.order_number.clone(),
                timestamp.clone(),
                item.product_name.clone(),
                item.quantity.to_string(),
                item.price.to_string(),
                item.base_price.to_string(),
                to_f64(profit).to_string(),
                order.status.as_str().to_string(),
            ])?;
        }
    }

    wtr.flush()?;
    wtr.into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// `sales_<start>_to_<end>.csv`, keeping only filename-safe characters
pub fn export_filename(start: &str, end: &str) -> String {
    let clean = |s: &str| -> String {
        s.chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
            .collect()
    };
    format!("sales_{}_to_{}.csv", clean(start), clean(end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::OrderItem;
    use shared::models::{OrderSource, OrderStatus, OrderType};

    fn order() -> Order {
        Order {
            id: None,
            order_number: "ORD-1704067200000".into(),
            table_id: None,
            order_type: OrderType::ToGo,
            items: vec![
                OrderItem {
                    product_id: "product:latte".into(),
                    product_name: "Latte, large".into(),
                    price: 3.5,
                    base_price: 1.2,
                    quantity: 2,
                },
                OrderItem {
                    product_id: "product:cookie".into(),
                    product_name: "Cookie".into(),
                    price: 2.0,
                    base_price: 0.5,
                    quantity: 1,
                },
            ],
            total: 9.0,
            base_total: 2.9,
            status: OrderStatus::Paid,
            source: OrderSource::Pos,
            stock_usage: vec![],
            stock_applied: true,
            timestamp: 1_704_067_200_000,
        }
    }

    #[test]
    fn test_one_row_per_item() {
        let bytes = write_sales_csv(&[order()], Tz::UTC).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "order_number,timestamp,product_name,quantity,price,base_price,profit,status"
        );
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "ORD-1704067200000,2024-01-01T00:00:00+00:00,\"Latte, large\",2,3.5,1.2,4.6,paid"
        );
        assert!(lines[2].starts_with("ORD-1704067200000,"));
        assert!(lines[2].ends_with(",Cookie,1,2,0.5,1.5,paid"));
    }

    #[test]
    fn test_empty_export_has_header() {
        let text = String::from_utf8(write_sales_csv(&[], Tz::UTC).unwrap()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_filename_is_sanitized() {
        assert_eq!(
            export_filename("2024-01-01", "2024-01-31"),
            "sales_2024-01-01_to_2024-01-31.csv"
        );
        assert_eq!(export_filename("../etc", "x\"y"), "sales_etc_to_xy.csv");
    }
}
