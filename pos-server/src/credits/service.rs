//! Credit service
//!
//! Credit orders deduct stock like POS orders but never hold a table.
//! Balance changes run under the server ledger lock.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::error::ErrorCode;
use shared::models::{CreditOrderStatus, OrderType, ReferenceType};
use tokio::sync::Mutex;

use crate::core::ServerState;
use crate::db::models::{
    CreditCustomer, CreditCustomerCreate, CreditCustomerSummary, CreditOrder, CreditOrderCreate,
    CreditOrderDetail, CreditOrderQuery, CreditOrderWithCustomer, CreditPayment,
    CreditPaymentCreate,
};
use crate::db::repository::{
    CreditCustomerRepository, CreditOrderRepository, CreditPaymentRepository,
    DiningTableRepository, ProductRepository, RepoError,
};
use crate::inventory::{StockLedger, compute_usage};
use crate::orders::money::{compute_totals, to_decimal, to_f64};
use crate::orders::number;
use crate::orders::pricing::{PriceSource, price_items};
use crate::utils::time::now_millis;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// Settlement after paying `amount` on an order: (amount_paid, remaining_balance, status)
pub fn settle(order: &CreditOrder, amount: f64) -> (f64, f64, CreditOrderStatus) {
    let paid = to_decimal(order.amount_paid) + to_decimal(amount);
    let remaining = (to_decimal(order.total) - paid).max(Decimal::ZERO);
    let status = if remaining.is_zero() {
        CreditOrderStatus::Paid
    } else if paid.is_zero() {
        CreditOrderStatus::Pending
    } else {
        CreditOrderStatus::Partial
    };
    (to_f64(paid), to_f64(remaining), status)
}

/// Payment result
#[derive(Debug, Clone, Serialize)]
pub struct PaymentReceipt {
    pub order: CreditOrder,
    pub payment: CreditPayment,
}

fn customer_not_found(id: &str) -> AppError {
    AppError::with_message(
        ErrorCode::CreditCustomerNotFound,
        format!("Customer {} not found", id),
    )
}

fn credit_order_not_found(id: &str) -> AppError {
    AppError::with_message(
        ErrorCode::CreditOrderNotFound,
        format!("Credit order {} not found", id),
    )
}

#[derive(Clone)]
pub struct CreditService {
    customers: CreditCustomerRepository,
    orders: CreditOrderRepository,
    payments: CreditPaymentRepository,
    products: ProductRepository,
    tables: DiningTableRepository,
    ledger: StockLedger,
    lock: Arc<Mutex<()>>,
}

impl CreditService {
    pub fn new(state: &ServerState) -> Self {
        let db = state.get_db();
        Self {
            customers: CreditCustomerRepository::new(db.clone()),
            orders: CreditOrderRepository::new(db.clone()),
            payments: CreditPaymentRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            tables: DiningTableRepository::new(db.clone()),
            ledger: StockLedger::new(db, state.config.allow_negative_stock),
            lock: state.ledger_lock.clone(),
        }
    }

    // ========== Customers ==========

    pub async fn list_customers(&self) -> AppResult<Vec<CreditCustomer>> {
        Ok(self.customers.find_all().await?)
    }

    pub async fn create_customer(&self, payload: CreditCustomerCreate) -> AppResult<CreditCustomer> {
        let name = payload.name.trim().to_string();
        validate_required_text(&name, "name", MAX_NAME_LEN)?;
        validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;

        let customer = CreditCustomer {
            id: None,
            name,
            phone: payload.phone.map(|p| p.trim().to_string()),
            address: payload.address.map(|a| a.trim().to_string()),
            total_credit: 0.0,
            created_at: now_millis(),
            last_transaction: None,
        };

        let created = self.customers.create(customer).await.map_err(|e| match e {
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::CreditCustomerExists, msg),
            other => other.into(),
        })?;
        tracing::info!(customer_id = %created.id_string(), name = %created.name, "Credit customer created");
        Ok(created)
    }

    pub async fn customer_summary(&self, id: &str) -> AppResult<CreditCustomerSummary> {
        let customer = self
            .customers
            .find_by_id(id)
            .await?
            .ok_or_else(|| customer_not_found(id))?;
        let orders = self.orders.find_by_customer(&customer.id_string()).await?;

        let count = |status: CreditOrderStatus| orders.iter().filter(|o| o.status == status).count();
        let summary = CreditCustomerSummary {
            total_orders: orders.len(),
            pending_orders: count(CreditOrderStatus::Pending),
            partial_orders: count(CreditOrderStatus::Partial),
            paid_orders: count(CreditOrderStatus::Paid),
            recent_orders: orders.iter().take(5).cloned().collect(),
            customer,
        };
        Ok(summary)
    }

    // ========== Credit orders ==========

    /// Credit orders, newest first, each with its customer joined
    pub async fn list_orders(&self, query: CreditOrderQuery) -> AppResult<Vec<CreditOrderWithCustomer>> {
        let customer_filter = match query.customer_id.as_deref() {
            Some(raw) => Some(
                crate::db::repository::parse_record_id("credit_customer", raw)?.to_string(),
            ),
            None => None,
        };
        let orders = self
            .orders
            .find_all(customer_filter.as_deref(), query.status)
            .await?;

        let customers = self.customers.find_all().await?;
        Ok(orders
            .into_iter()
            .map(|order| {
                let customer = customers
                    .iter()
                    .find(|c| c.id_string() == order.customer_id)
                    .cloned();
                CreditOrderWithCustomer { order, customer }
            })
            .collect())
    }

    pub async fn order_detail(&self, id: &str) -> AppResult<CreditOrderDetail> {
        let order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| credit_order_not_found(id))?;
        let payments = self.payments.find_by_order(&order.id_string()).await?;
        Ok(CreditOrderDetail { order, payments })
    }

    pub async fn create_order(&self, payload: CreditOrderCreate) -> AppResult<CreditOrder> {
        if payload.order_type == OrderType::Employee {
            return Err(AppError::validation(
                "Credit orders must be dine-in or to-go",
            ));
        }

        let _guard = self.lock.lock().await;

        let customer = self
            .customers
            .find_by_id(&payload.customer_id)
            .await?
            .ok_or_else(|| customer_not_found(&payload.customer_id))?;
        let customer_id = customer.id_string();

        let priced = price_items(&self.products, payload.items, PriceSource::AllowOverride).await?;

        let table_id = match (payload.order_type, payload.table_id) {
            (OrderType::DineIn, Some(table_ref)) => {
                let number = table_ref
                    .table_number()
                    .ok_or_else(|| AppError::validation(format!("Invalid table: {:?}", table_ref)))?;
                let table = self.tables.find_by_number(number).await?.ok_or_else(|| {
                    AppError::with_message(ErrorCode::TableNotFound, format!("Table {} not found", number))
                })?;
                Some(table.id_string())
            }
            _ => None,
        };

        let totals = compute_totals(&priced.items, payload.order_type);
        let usage = compute_usage(&priced.items, &priced.products);
        self.ledger.check_available(&usage).await?;

        let (order_number, timestamp) = number::credit_order_number();
        let status = if totals.total > 0.0 {
            CreditOrderStatus::Pending
        } else {
            CreditOrderStatus::Paid
        };
        let order = CreditOrder {
            id: None,
            order_number,
            customer_id: customer_id.clone(),
            customer_name: customer.name.clone(),
            items: priced.items,
            total: totals.total,
            base_total: totals.base_total,
            amount_paid: 0.0,
            remaining_balance: totals.total,
            status,
            table_id,
            order_type: payload.order_type,
            stock_usage: usage,
            timestamp,
        };
        let created = self.orders.create(order).await?;
        let order_id = created.id_string();

        self.ledger
            .consume(&created.stock_usage, ReferenceType::CreditOrder, &order_id)
            .await?;
        self.customers
            .add_credit(&customer_id, created.total, timestamp)
            .await?;

        tracing::info!(
            credit_order_id = %order_id,
            customer_id = %customer_id,
            total = created.total,
            "Credit order created"
        );
        Ok(created)
    }

    /// Record a payment: `0 < amount <= remaining_balance`
    pub async fn record_payment(
        &self,
        order_id: &str,
        payload: CreditPaymentCreate,
    ) -> AppResult<PaymentReceipt> {
        validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;

        let _guard = self.lock.lock().await;

        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| credit_order_not_found(order_id))?;

        let amount = to_decimal(payload.amount);
        if !payload.amount.is_finite()
            || amount <= Decimal::ZERO
            || amount > to_decimal(order.remaining_balance)
        {
            return Err(AppError::with_message(
                ErrorCode::PaymentInvalidAmount,
                format!(
                    "Payment amount must be greater than 0 and at most {}",
                    order.remaining_balance
                ),
            )
            .with_detail("remaining_balance", order.remaining_balance));
        }
        let amount = to_f64(amount);
        let id = order.id_string();
        let at = now_millis();

        // 先结算再记付款; 付款写入失败时回滚结算, 不留孤立付款
        let (paid, remaining, status) = settle(&order, amount);
        let updated = self.orders.set_settlement(&id, paid, remaining, status).await?;

        let payment = match self
            .payments
            .create(CreditPayment {
                id: None,
                credit_order_id: id.clone(),
                customer_id: order.customer_id.clone(),
                amount,
                payment_method: payload.payment_method,
                notes: payload.notes.filter(|n| !n.trim().is_empty()),
                timestamp: at,
            })
            .await
        {
            Ok(payment) => payment,
            Err(e) => {
                if let Err(rollback) = self
                    .orders
                    .set_settlement(&id, order.amount_paid, order.remaining_balance, order.status)
                    .await
                {
                    tracing::error!(credit_order_id = %id, error = %rollback, "Failed to roll back settlement");
                }
                return Err(e.into());
            }
        };

        match self.customers.add_credit(&order.customer_id, -amount, at).await {
            Ok(_) => {}
            Err(RepoError::NotFound(_)) => {
                tracing::warn!(customer_id = %order.customer_id, "Payment for a deleted customer");
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            credit_order_id = %id,
            amount,
            remaining,
            status = ?status,
            "Credit payment recorded"
        );
        Ok(PaymentReceipt {
            order: updated,
            payment,
        })
    }
}
