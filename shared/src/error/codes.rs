//! 错误码表
//!
//! 千位表示业务域 (见 [`ErrorCategory`](super::ErrorCategory))，前端按数值分支，
//! 不解析 message。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 一张表同时生成枚举、默认文案和 u16 反查
macro_rules! error_codes {
    ($( $(#[$doc:meta])* $name:ident = $value:literal => $msg:literal, )*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "u16", try_from = "u16")]
        #[repr(u16)]
        pub enum ErrorCode {
            $( $(#[$doc])* $name = $value, )*
        }

        impl ErrorCode {
            /// 默认文案，可被 `AppError::with_message` 覆盖
            pub const fn message(&self) -> &'static str {
                match self {
                    $( Self::$name => $msg, )*
                }
            }
        }

        impl TryFrom<u16> for ErrorCode {
            type Error = InvalidErrorCode;

            fn try_from(value: u16) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok(Self::$name), )*
                    _ => Err(InvalidErrorCode(value)),
                }
            }
        }
    };
}

error_codes! {
    // 0xxx
    ValidationFailed = 2 => "Validation failed",
    NotFound = 3 => "Resource not found",
    AlreadyExists = 4 => "Resource already exists",

    // 1xxx 认证
    /// 没带 Bearer token
    NotAuthenticated = 1001 => "No token provided",
    /// 邮箱不存在和密码错误共用
    InvalidCredentials = 1002 => "Invalid credentials",
    TokenExpired = 1003 => "Authentication token has expired",
    TokenInvalid = 1004 => "Invalid token",
    AccountDisabled = 1007 => "Account is deactivated",
    PasswordTooShort = 1008 => "Password must be at least 8 characters",

    // 2xxx 权限
    AdminRequired = 2003 => "Admin access required",
    /// 引导创建的管理员账号不可删除
    CannotDeleteAdmin = 2005 => "Cannot delete the default admin user",
    /// 引导管理员的邮箱、角色、启用状态不可修改
    CannotModifyAdmin = 2006 => "Cannot change the default admin's email, role or status",

    // 3xxx 赊账
    CreditCustomerNotFound = 3001 => "Customer not found",
    CreditCustomerExists = 3002 => "Customer already exists",
    CreditOrderNotFound = 3003 => "Credit order not found",

    // 4xxx 订单
    OrderNotFound = 4001 => "Order not found",
    OrderCancelled = 4004 => "Order has been cancelled",
    OrderEmpty = 4007 => "Order is empty",
    OrderItemInvalid = 4008 => "Order item is invalid",

    // 5xxx 付款/支出
    /// 零、负数或超过余额
    PaymentInvalidAmount = 5002 => "Invalid payment amount",
    ExpenseNotFound = 5101 => "Expense not found",

    // 6xxx 商品/库存/促销
    ProductNotFound = 6001 => "Product not found",
    ProductInvalidPrice = 6002 => "Product has invalid price",
    StockNotFound = 6501 => "Stock item not found",
    /// 关闭负库存时扣减不足
    StockInsufficient = 6502 => "Insufficient stock",
    /// 仍被商品配方引用
    StockInUse = 6503 => "Stock item is used by products",
    PromoNotFound = 6601 => "Promo slide not found",

    // 7xxx 桌台
    TableNotFound = 7001 => "Table not found",
    TableOccupied = 7002 => "Table is occupied",

    // 8xxx 用户
    UserNotFound = 8001 => "User not found",
    UserEmailExists = 8002 => "User already exists",
    UserCannotDeleteSelf = 8003 => "Cannot delete own account",
    UserCannotDemoteSelf = 8004 => "Cannot deactivate or demote own account",

    // 9xxx 系统
    InternalError = 9001 => "Internal server error",
    DatabaseError = 9002 => "Database error",
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// u16 不在错误码表里
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
