//! Daily sales and profit aggregation

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{OrderStatus, OrderType};

use crate::db::models::{Expense, Order};
use crate::orders::money::{to_decimal, to_f64};

/// Totals of the daily sales summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesTotals {
    pub total_orders: usize,
    pub total_revenue: f64,
    pub total_cost: f64,
    pub total_profit: f64,
}

/// Per-product line of the daily sales summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSales {
    pub product_name: String,
    pub quantity_sold: u64,
    pub total_revenue: f64,
    pub total_cost: f64,
    pub profit: f64,
}

/// `GET /api/orders/summary/{date}`
#[derive(Debug, Clone, Serialize)]
pub struct SalesSummary {
    pub date: String,
    pub totals: SalesTotals,
    pub products: Vec<ProductSales>,
}

#[derive(Default)]
struct ProductAcc {
    quantity: u64,
    revenue: Decimal,
    cost: Decimal,
}

/// Aggregate a day's orders; cancelled orders are excluded
///
/// Employee orders contribute cost but no revenue, matching their stored totals.
pub fn sales_summary(date: NaiveDate, orders: &[Order]) -> SalesSummary {
    let counted: Vec<&Order> = orders
        .iter()
        .filter(|o| o.status != OrderStatus::Cancelled)
        .collect();

    let revenue: Decimal = counted.iter().map(|o| to_decimal(o.total)).sum();
    let cost: Decimal = counted.iter().map(|o| to_decimal(o.base_total)).sum();

    let mut per_product: BTreeMap<String, ProductAcc> = BTreeMap::new();
    for order in &counted {
        let earns = order.order_type != OrderType::Employee;
        for item in &order.items {
            let qty = Decimal::from(item.quantity);
            let acc = per_product.entry(item.product_name.clone()).or_default();
            acc.quantity += u64::from(item.quantity);
            if earns {
                acc.revenue += to_decimal(item.price) * qty;
            }
            acc.cost += to_decimal(item.base_price) * qty;
        }
    }

    let mut products: Vec<ProductSales> = per_product
        .into_iter()
        .map(|(product_name, acc)| ProductSales {
            product_name,
            quantity_sold: acc.quantity,
            total_revenue: to_f64(acc.revenue),
            total_cost: to_f64(acc.cost),
            profit: to_f64(acc.revenue - acc.cost),
        })
        .collect();
    products.sort_by(|a, b| {
        b.quantity_sold
            .cmp(&a.quantity_sold)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });

    SalesSummary {
        date: date.format("%Y-%m-%d").to_string(),
        totals: SalesTotals {
            total_orders: counted.len(),
            total_revenue: to_f64(revenue),
            total_cost: to_f64(cost),
            total_profit: to_f64(revenue - cost),
        },
        products,
    }
}

/// `GET /api/expenses/summary/{date}`
#[derive(Debug, Clone, Serialize)]
pub struct DailyProfit {
    pub date: String,
    pub revenue: f64,
    pub cost_of_goods: f64,
    pub gross_profit: f64,
    pub expenses: f64,
    pub net_profit: f64,
    pub expense_breakdown: Vec<Expense>,
}

/// Profit of a day from its **paid** orders minus its expenses
pub fn daily_profit(date: NaiveDate, orders: &[Order], expenses: Vec<Expense>) -> DailyProfit {
    let paid = orders.iter().filter(|o| o.status == OrderStatus::Paid);
    let (revenue, cost) = paid.fold((Decimal::ZERO, Decimal::ZERO), |(r, c), o| {
        (r + to_decimal(o.total), c + to_decimal(o.base_total))
    });
    let spent: Decimal = expenses.iter().map(|e| to_decimal(e.amount)).sum();
    let gross = revenue - cost;

    DailyProfit {
        date: date.format("%Y-%m-%d").to_string(),
        revenue: to_f64(revenue),
        cost_of_goods: to_f64(cost),
        gross_profit: to_f64(gross),
        expenses: to_f64(spent),
        net_profit: to_f64(gross - spent),
        expense_breakdown: expenses,
    }
}

/// `GET /api/expenses/today|week|month`
#[derive(Debug, Clone, Serialize)]
pub struct ExpensePeriod {
    pub total: f64,
    pub count: usize,
    /// First day (inclusive)
    pub start_date: String,
    /// Last day (inclusive)
    pub end_date: String,
    pub expenses: Vec<Expense>,
}

pub fn expense_period(start: NaiveDate, last: NaiveDate, expenses: Vec<Expense>) -> ExpensePeriod {
    let total: Decimal = expenses.iter().map(|e| to_decimal(e.amount)).sum();
    ExpensePeriod {
        total: to_f64(total),
        count: expenses.len(),
        start_date: start.format("%Y-%m-%d").to_string(),
        end_date: last.format("%Y-%m-%d").to_string(),
        expenses,
    }
}
