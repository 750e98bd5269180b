//! Resolve client-supplied order lines against the product catalogue

use std::collections::HashMap;

use shared::error::ErrorCode;

use crate::db::models::{OrderItem, OrderItemInput, Product};
use crate::db::repository::ProductRepository;
use crate::orders::money::{round_money, validate_items};
use crate::utils::{AppError, AppResult};

/// Priced lines plus the products they reference (keyed by "product:xxx")
#[derive(Debug, Clone)]
pub struct PricedItems {
    pub items: Vec<OrderItem>,
    pub products: HashMap<String, Product>,
}

/// How client-supplied prices are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    /// Cashier may override price / base_price / name per line
    AllowOverride,
    /// Prices and names always come from the catalogue (customer self-ordering)
    Catalogue,
}

/// Price `inputs`; every product must exist
pub async fn price_items(
    products: &ProductRepository,
    inputs: Vec<OrderItemInput>,
    source: PriceSource,
) -> AppResult<PricedItems> {
    if inputs.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }

    let mut items = Vec::with_capacity(inputs.len());
    let mut resolved: HashMap<String, Product> = HashMap::new();

    for input in inputs {
        let product = products
            .find_by_id(&input.product_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::ProductNotFound,
                    format!("Product {} not found", input.product_id),
                )
                .with_detail("product_id", input.product_id.clone())
            })?;
        let product_id = product.id_string();

        let item = match source {
            PriceSource::AllowOverride => OrderItem {
                product_id: product_id.clone(),
                product_name: input
                    .product_name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| product.name.clone()),
                price: input.price.unwrap_or(product.price),
                base_price: input.base_price.unwrap_or(product.base_price),
                quantity: input.quantity.unwrap_or(1),
            },
            PriceSource::Catalogue => OrderItem {
                product_id: product_id.clone(),
                product_name: product.name.clone(),
                price: product.price,
                base_price: product.base_price,
                quantity: input.quantity.unwrap_or(1),
            },
        };

        items.push(item);
        resolved.insert(product_id, product);
    }

    validate_items(&items)?;
    for item in &mut items {
        item.price = round_money(item.price);
        item.base_price = round_money(item.base_price);
    }

    Ok(PricedItems {
        items,
        products: resolved,
    })
}
