//! 订单模块 - 订单生命周期与库存/桌台一致性
//!
//! # 规则
//!
//! - 库存扣减: 订单未取消，且不是仍处于 pending 的顾客自助订单
//! - 占用桌台: 堂食订单状态为 pending/confirmed/unpaid，且不是仍处于 pending 的顾客自助订单
//!
//! 订单写入时快照 `stock_usage`，修改/删除按快照差额回补库存。

pub mod money;
pub mod number;
pub mod pricing;
pub mod service;

pub use service::{OrderService, holds_table, should_apply_stock};
