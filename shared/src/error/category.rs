//! 错误码按千位分类

use serde::{Deserialize, Serialize};

use super::codes::ErrorCode;

/// 错误码千位 -> 业务域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Auth,
    Permission,
    Credit,
    Order,
    /// 付款与支出
    Payment,
    /// 商品、库存、促销
    Product,
    Table,
    User,
    /// 9xxx 及越界值
    System,
}

impl From<u16> for ErrorCategory {
    fn from(code: u16) -> Self {
        match code / 1000 {
            0 => Self::General,
            1 => Self::Auth,
            2 => Self::Permission,
            3 => Self::Credit,
            4 => Self::Order,
            5 => Self::Payment,
            6 => Self::Product,
            7 => Self::Table,
            8 => Self::User,
            _ => Self::System,
        }
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from(self.code())
    }
}
