//! Credit Repositories (customers, credit orders, payments)

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{CreditCustomer, CreditOrder, CreditPayment};
use shared::models::CreditOrderStatus;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const CUSTOMER_TABLE: &str = "credit_customer";
pub const ORDER_TABLE: &str = "credit_order";
const PAYMENT_TABLE: &str = "credit_payment";

// =============================================================================
// Customers
// =============================================================================

#[derive(Clone)]
pub struct CreditCustomerRepository {
    base: BaseRepository,
}

impl CreditCustomerRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All customers ordered by name
    pub async fn find_all(&self) -> RepoResult<Vec<CreditCustomer>> {
        let customers: Vec<CreditCustomer> = self
            .base
            .db()
            .query("SELECT * FROM credit_customer ORDER BY name")
            .await?
            .take(0)?;
        Ok(customers)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<CreditCustomer>> {
        let thing = parse_record_id(CUSTOMER_TABLE, id)?;
        let customer: Option<CreditCustomer> = self.base.db().select(thing).await?;
        Ok(customer)
    }

    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<CreditCustomer>> {
        let name_owned = name.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM credit_customer WHERE name = $name LIMIT 1")
            .bind(("name", name_owned))
            .await?;
        let customers: Vec<CreditCustomer> = result.take(0)?;
        Ok(customers.into_iter().next())
    }

    /// Create a customer (name already trimmed)
    pub async fn create(&self, customer: CreditCustomer) -> RepoResult<CreditCustomer> {
        if self.find_by_name(&customer.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Customer '{}' already exists",
                customer.name
            )));
        }
        let created: Option<CreditCustomer> =
            self.base.db().create(CUSTOMER_TABLE).content(customer).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create customer".to_string()))
    }

    /// Atomically add `delta` to the outstanding balance
    pub async fn add_credit(&self, id: &str, delta: f64, at: i64) -> RepoResult<CreditCustomer> {
        let thing = parse_record_id(CUSTOMER_TABLE, id)?;
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET total_credit = math::round((total_credit + $delta) * 100) / 100, last_transaction = $at RETURN AFTER",
            )
            .bind(("thing", thing))
            .bind(("delta", delta))
            .bind(("at", at))
            .await?;
        let updated: Option<CreditCustomer> = result.take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Customer {} not found", id)))
    }
}

// =============================================================================
// Credit orders
// =============================================================================

#[derive(Clone)]
pub struct CreditOrderRepository {
    base: BaseRepository,
}

impl CreditOrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Credit orders, newest first, optionally filtered
    pub async fn find_all(
        &self,
        customer_id: Option<&str>,
        status: Option<CreditOrderStatus>,
    ) -> RepoResult<Vec<CreditOrder>> {
        let orders: Vec<CreditOrder> = self
            .base
            .db()
            .query("SELECT * FROM credit_order ORDER BY timestamp DESC")
            .await?
            .take(0)?;
        Ok(orders
            .into_iter()
            .filter(|o| customer_id.is_none_or(|c| o.customer_id == c))
            .filter(|o| status.is_none_or(|s| o.status == s))
            .collect())
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<CreditOrder>> {
        let thing = parse_record_id(ORDER_TABLE, id)?;
        let order: Option<CreditOrder> = self.base.db().select(thing).await?;
        Ok(order)
    }

    /// Orders of one customer, newest first
    pub async fn find_by_customer(&self, customer_id: &str) -> RepoResult<Vec<CreditOrder>> {
        let customer_owned = customer_id.to_string();
        let orders: Vec<CreditOrder> = self
            .base
            .db()
            .query("SELECT * FROM credit_order WHERE customer_id = $customer ORDER BY timestamp DESC")
            .bind(("customer", customer_owned))
            .await?
            .take(0)?;
        Ok(orders)
    }

    pub async fn create(&self, order: CreditOrder) -> RepoResult<CreditOrder> {
        let created: Option<CreditOrder> =
            self.base.db().create(ORDER_TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create credit order".to_string()))
    }

    /// Write settlement fields after a payment
    pub async fn set_settlement(
        &self,
        id: &str,
        amount_paid: f64,
        remaining_balance: f64,
        status: CreditOrderStatus,
    ) -> RepoResult<CreditOrder> {
        let thing = parse_record_id(ORDER_TABLE, id)?;
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET amount_paid = $paid, remaining_balance = $remaining, status = $status RETURN AFTER",
            )
            .bind(("thing", thing))
            .bind(("paid", amount_paid))
            .bind(("remaining", remaining_balance))
            .bind(("status", status))
            .await?;
        let updated: Option<CreditOrder> = result.take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Credit order {} not found", id)))
    }
}

// =============================================================================
// Payments
// =============================================================================

#[derive(Clone)]
pub struct CreditPaymentRepository {
    base: BaseRepository,
}

impl CreditPaymentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, payment: CreditPayment) -> RepoResult<CreditPayment> {
        let created: Option<CreditPayment> =
            self.base.db().create(PAYMENT_TABLE).content(payment).await?;
        created.ok_or_else(|| RepoError::Database("Failed to record payment".to_string()))
    }

    /// Payments of one credit order, oldest first
    pub async fn find_by_order(&self, credit_order_id: &str) -> RepoResult<Vec<CreditPayment>> {
        let order_owned = credit_order_id.to_string();
        let payments: Vec<CreditPayment> = self
            .base
            .db()
            .query("SELECT * FROM credit_payment WHERE credit_order_id = $order ORDER BY timestamp")
            .bind(("order", order_owned))
            .await?
            .take(0)?;
        Ok(payments)
    }
}
