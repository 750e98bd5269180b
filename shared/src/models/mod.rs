//! Domain vocabulary
//!
//! Status and category enums shared between the server and clients.
//! All of them serialize to the lowercase / kebab-case strings the
//! frontend already uses.

pub mod catalog;
pub mod credit;
pub mod order;
pub mod stock;
pub mod table;
pub mod user;

// Re-exports
pub use catalog::*;
pub use credit::*;
pub use order::*;
pub use stock::*;
pub use table::*;
pub use user::*;
