//! Order lifecycle service
//!
//! Every mutation runs under the server ledger lock so stock, table and order
//! documents change together.

use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;
use shared::error::ErrorCode;
use shared::models::{OrderSource, OrderStatus, OrderType, ReferenceType, TableStatus};
use tokio::sync::Mutex;

use crate::core::ServerState;
use crate::db::models::{DiningTable, Order, OrderCreate, OrderItemInput, TableRef};
use crate::db::repository::{DiningTableRepository, OrderRepository, ProductRepository};
use crate::inventory::{StockLedger, compute_usage};
use crate::orders::money::compute_totals;
use crate::orders::number;
use crate::orders::pricing::{PriceSource, price_items};
use crate::utils::time::{day_end_millis, day_start_millis};
use crate::utils::{AppError, AppResult};

/// Whether an order's usage is deducted from stock
pub fn should_apply_stock(status: OrderStatus, source: OrderSource) -> bool {
    status != OrderStatus::Cancelled
        && !(source == OrderSource::Client && status == OrderStatus::Pending)
}

/// Whether an order keeps its dining table occupied
pub fn holds_table(order_type: OrderType, status: OrderStatus, source: OrderSource) -> bool {
    order_type == OrderType::DineIn
        && status.is_open()
        && !(source == OrderSource::Client && status == OrderStatus::Pending)
}

/// Table number of a stored `table_id` ("dining_table:4")
pub fn table_number_of(table_id: &str) -> Option<u32> {
    TableRef::Text(table_id.to_string()).table_number()
}

fn order_holds_table(order: &Order) -> bool {
    order.table_id.is_some() && holds_table(order.order_type, order.status, order.source)
}

fn order_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::OrderNotFound, format!("Order {} not found", id))
}

/// Order service
#[derive(Clone)]
pub struct OrderService {
    orders: OrderRepository,
    products: ProductRepository,
    tables: DiningTableRepository,
    ledger: StockLedger,
    lock: Arc<Mutex<()>>,
    timezone: Tz,
}

impl OrderService {
    pub fn new(state: &ServerState) -> Self {
        let db = state.get_db();
        Self {
            orders: OrderRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            tables: DiningTableRepository::new(db.clone()),
            ledger: StockLedger::new(db, state.config.allow_negative_stock),
            lock: state.ledger_lock.clone(),
            timezone: state.config.timezone,
        }
    }

    // ========== Queries ==========

    pub async fn get(&self, id: &str) -> AppResult<Order> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| order_not_found(id))
    }

    /// Orders of one business day, newest first
    pub async fn list_by_date(&self, date: NaiveDate) -> AppResult<Vec<Order>> {
        let start = day_start_millis(date, self.timezone);
        let end = day_end_millis(date, self.timezone);
        Ok(self.orders.find_in_range(start, end).await?)
    }

    pub async fn list_tables(&self) -> AppResult<Vec<DiningTable>> {
        Ok(self.tables.find_all().await?)
    }

    /// Open order currently holding table `number`, if any
    pub async fn open_order_for_table(&self, number: u32) -> AppResult<Option<Order>> {
        let table = self.find_table(number).await?;
        let Some(order_id) = table.current_order else {
            return Ok(None);
        };
        Ok(self
            .orders
            .find_by_id(&order_id)
            .await?
            .filter(order_holds_table))
    }

    // ========== Mutations ==========

    /// Create a cashier order
    pub async fn create(&self, payload: OrderCreate) -> AppResult<Order> {
        let status = payload.status.unwrap_or_default();
        self.create_order(
            payload.items,
            payload.order_type,
            payload.table_id,
            status,
            OrderSource::Pos,
            PriceSource::AllowOverride,
        )
        .await
    }

    /// Create a customer self-order (always pending dine-in, catalogue prices)
    pub async fn create_client_order(
        &self,
        table_number: u32,
        items: Vec<OrderItemInput>,
    ) -> AppResult<Order> {
        self.create_order(
            items,
            OrderType::DineIn,
            Some(TableRef::Number(table_number)),
            OrderStatus::Pending,
            OrderSource::Client,
            PriceSource::Catalogue,
        )
        .await
    }

    async fn create_order(
        &self,
        inputs: Vec<OrderItemInput>,
        order_type: OrderType,
        table_ref: Option<TableRef>,
        status: OrderStatus,
        source: OrderSource,
        price_source: PriceSource,
    ) -> AppResult<Order> {
        let _guard = self.lock.lock().await;

        let priced = price_items(&self.products, inputs, price_source).await?;
        let table = match (order_type, table_ref) {
            (OrderType::DineIn, Some(table_ref)) => Some(self.resolve_table(&table_ref).await?),
            _ => None,
        };

        let totals = compute_totals(&priced.items, order_type);
        let usage = compute_usage(&priced.items, &priced.products);
        let (order_number, timestamp) = match (source, &table) {
            (OrderSource::Client, Some(t)) => number::client_order_number(t.table_number),
            _ => number::order_number(),
        };

        let apply_stock = should_apply_stock(status, source);
        let take_table = table.is_some() && holds_table(order_type, status, source);

        // 校验全部通过后才写入
        if take_table && let Some(t) = &table {
            self.ensure_table_free(t, None).await?;
        }
        if apply_stock {
            self.ledger.check_available(&usage).await?;
        }

        let order = Order {
            id: None,
            order_number,
            table_id: table.as_ref().map(DiningTable::id_string),
            order_type,
            items: priced.items,
            total: totals.total,
            base_total: totals.base_total,
            status,
            source,
            stock_usage: usage,
            stock_applied: apply_stock,
            timestamp,
        };
        let created = self.orders.create(order).await?;
        let order_id = created.id_string();

        if apply_stock {
            self.ledger
                .consume(&created.stock_usage, ReferenceType::Order, &order_id)
                .await?;
        }
        if take_table && let Some(t) = &table {
            self.tables.occupy(t.table_number, &order_id).await?;
        }

        tracing::info!(
            order_id = %order_id,
            order_number = %created.order_number,
            total = created.total,
            source = ?created.source,
            "Order created"
        );
        Ok(created)
    }

    /// Replace the items of an order and move stock by the usage difference
    pub async fn update_items(&self, id: &str, inputs: Vec<OrderItemInput>) -> AppResult<Order> {
        let _guard = self.lock.lock().await;

        let mut order = self.get(id).await?;
        if order.status == OrderStatus::Cancelled {
            return Err(AppError::with_message(
                ErrorCode::OrderCancelled,
                "Cancelled orders cannot be edited",
            ));
        }

        let price_source = match order.source {
            OrderSource::Client => PriceSource::Catalogue,
            OrderSource::Pos => PriceSource::AllowOverride,
        };
        let priced = price_items(&self.products, inputs, price_source).await?;
        let totals = compute_totals(&priced.items, order.order_type);
        let new_usage = compute_usage(&priced.items, &priced.products);
        let order_id = order.id_string();

        if order.stock_applied {
            self.ledger
                .apply_difference(&order.stock_usage, &new_usage, ReferenceType::Order, &order_id)
                .await?;
        }

        order.items = priced.items;
        order.total = totals.total;
        order.base_total = totals.base_total;
        order.stock_usage = new_usage;
        let saved = self.orders.save(&order_id, &order).await?;

        tracing::info!(order_id = %order_id, total = saved.total, "Order items updated");
        Ok(saved)
    }

    /// Change status; stock and table follow the lifecycle rules
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> AppResult<Order> {
        let _guard = self.lock.lock().await;

        let mut order = self.get(id).await?;
        if order.status == status {
            return Ok(order);
        }
        let order_id = order.id_string();
        let previous = order.status;

        let was_applied = order.stock_applied;
        let apply_after = should_apply_stock(status, order.source);
        let held_before = order_holds_table(&order);
        let held_after =
            order.table_id.is_some() && holds_table(order.order_type, status, order.source);
        let table_number = order.table_id.as_deref().and_then(table_number_of);

        // 校验
        if held_after
            && !held_before
            && let Some(number) = table_number
        {
            let table = self.find_table(number).await?;
            self.ensure_table_free(&table, Some(&order_id)).await?;
        }
        if apply_after && !was_applied {
            self.ledger.check_available(&order.stock_usage).await?;
        }

        // 写入
        match (was_applied, apply_after) {
            (false, true) => {
                self.ledger
                    .consume(&order.stock_usage, ReferenceType::Order, &order_id)
                    .await?
            }
            (true, false) => {
                self.ledger
                    .restore(&order.stock_usage, ReferenceType::Order, &order_id)
                    .await?
            }
            _ => {}
        }

        order.status = status;
        order.stock_applied = apply_after;
        let saved = self.orders.save(&order_id, &order).await?;

        if let Some(number) = table_number {
            if held_before && !held_after {
                self.tables.release(number, &order_id).await?;
            } else if held_after && !held_before {
                self.tables.occupy(number, &order_id).await?;
            }
        }

        tracing::info!(
            order_id = %order_id,
            from = previous.as_str(),
            to = status.as_str(),
            "Order status changed"
        );
        Ok(saved)
    }

    /// Delete an order, returning its stock and freeing its table
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let _guard = self.lock.lock().await;

        let order = self.get(id).await?;
        let order_id = order.id_string();

        if order.stock_applied {
            self.ledger
                .restore(&order.stock_usage, ReferenceType::Order, &order_id)
                .await?;
        }
        if let Some(number) = order.table_id.as_deref().and_then(table_number_of) {
            self.tables.release(number, &order_id).await?;
        }
        self.orders.delete(&order_id).await?;

        tracing::info!(order_id = %order_id, order_number = %order.order_number, "Order deleted");
        Ok(())
    }

    // ========== Helpers ==========

    async fn find_table(&self, number: u32) -> AppResult<DiningTable> {
        self.tables.find_by_number(number).await?.ok_or_else(|| {
            AppError::with_message(ErrorCode::TableNotFound, format!("Table {} not found", number))
                .with_detail("table_number", number)
        })
    }

    async fn resolve_table(&self, table_ref: &TableRef) -> AppResult<DiningTable> {
        let number = table_ref
            .table_number()
            .ok_or_else(|| AppError::validation(format!("Invalid table: {:?}", table_ref)))?;
        self.find_table(number).await
    }

    /// 409 when another order still holds the table
    async fn ensure_table_free(&self, table: &DiningTable, except: Option<&str>) -> AppResult<()> {
        if table.status != TableStatus::Occupied {
            return Ok(());
        }
        let Some(holder_id) = table.current_order.as_deref() else {
            return Ok(());
        };
        if except == Some(holder_id) {
            return Ok(());
        }
        // 占用记录可能已过期 (订单已删除或已结束)
        let still_held = self
            .orders
            .find_by_id(holder_id)
            .await?
            .is_some_and(|o| order_holds_table(&o));
        if still_held {
            return Err(AppError::with_message(
                ErrorCode::TableOccupied,
                format!("Table {} is occupied", table.table_number),
            )
            .with_detail("table_number", table.table_number)
            .with_detail("current_order", holder_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_rule() {
        use OrderStatus::*;
        assert!(should_apply_stock(Pending, OrderSource::Pos));
        assert!(should_apply_stock(Paid, OrderSource::Pos));
        assert!(!should_apply_stock(Cancelled, OrderSource::Pos));
        assert!(!should_apply_stock(Pending, OrderSource::Client));
        assert!(should_apply_stock(Confirmed, OrderSource::Client));
        assert!(!should_apply_stock(Cancelled, OrderSource::Client));
    }

    #[test]
    fn test_table_rule() {
        use OrderStatus::*;
        assert!(holds_table(OrderType::DineIn, Pending, OrderSource::Pos));
        assert!(holds_table(OrderType::DineIn, Unpaid, OrderSource::Pos));
        assert!(!holds_table(OrderType::DineIn, Paid, OrderSource::Pos));
        assert!(!holds_table(OrderType::DineIn, Cancelled, OrderSource::Pos));
        assert!(!holds_table(OrderType::ToGo, Pending, OrderSource::Pos));
        assert!(!holds_table(OrderType::DineIn, Pending, OrderSource::Client));
        assert!(holds_table(OrderType::DineIn, Confirmed, OrderSource::Client));
    }

    #[test]
    fn test_table_number_of() {
        assert_eq!(table_number_of("dining_table:4"), Some(4));
        assert_eq!(table_number_of("garden"), None);
    }
}
