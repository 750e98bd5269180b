//! 库存模块 - 库存流水记账
//!
//! 所有库存数量变更都经过 [`StockLedger`]：原子 `+=` 更新 + 追加一条 stock_movement。

pub mod ledger;

pub use ledger::{StockLedger, compute_usage, diff_usage};
