//! 赊账模块 - 顾客赊账订单与还款

pub mod service;

pub use service::{CreditService, settle};
