//! Database Models

// Serde helpers
pub mod serde_helpers;

// Auth
pub mod user;

// Catalog
pub mod product;
pub mod promo;

// Inventory
pub mod stock;

// Floor
pub mod dining_table;

// Sales
pub mod order;
pub mod credit;

// Back office
pub mod expense;

pub use credit::*;
pub use dining_table::*;
pub use expense::*;
pub use order::*;
pub use product::*;
pub use promo::*;
pub use stock::*;
pub use user::*;
