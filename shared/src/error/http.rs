//! ErrorCode -> HTTP 状态码

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// 未列出的业务错误一律 400
    pub fn http_status(&self) -> StatusCode {
        use ErrorCode::*;
        match self {
            NotFound | OrderNotFound | ProductNotFound | StockNotFound | PromoNotFound
            | TableNotFound | UserNotFound | CreditCustomerNotFound | CreditOrderNotFound
            | ExpenseNotFound => StatusCode::NOT_FOUND,

            AlreadyExists | TableOccupied | StockInsufficient | StockInUse | UserEmailExists
            | CreditCustomerExists => StatusCode::CONFLICT,

            NotAuthenticated | InvalidCredentials | TokenExpired | TokenInvalid
            | AccountDisabled => StatusCode::UNAUTHORIZED,

            AdminRequired | CannotDeleteAdmin | CannotModifyAdmin | UserCannotDeleteSelf
            | UserCannotDemoteSelf => StatusCode::FORBIDDEN,

            // 已取消订单上的编辑
            OrderCancelled => StatusCode::UNPROCESSABLE_ENTITY,

            InternalError | DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,

            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ErrorCode::CreditOrderNotFound, StatusCode::NOT_FOUND),
            (ErrorCode::TableNotFound, StatusCode::NOT_FOUND),
            (ErrorCode::TableOccupied, StatusCode::CONFLICT),
            (ErrorCode::StockInsufficient, StatusCode::CONFLICT),
            (ErrorCode::AccountDisabled, StatusCode::UNAUTHORIZED),
            (ErrorCode::AdminRequired, StatusCode::FORBIDDEN),
            (ErrorCode::UserCannotDeleteSelf, StatusCode::FORBIDDEN),
            (ErrorCode::CannotModifyAdmin, StatusCode::FORBIDDEN),
            (ErrorCode::UserCannotDemoteSelf, StatusCode::FORBIDDEN),
            (ErrorCode::OrderCancelled, StatusCode::UNPROCESSABLE_ENTITY),
            (ErrorCode::DatabaseError, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (code, status) in cases {
            assert_eq!(code.http_status(), status, "{code:?}");
        }
    }

    #[test]
    fn test_business_errors_default_to_bad_request() {
        for code in [
            ErrorCode::ValidationFailed,
            ErrorCode::PaymentInvalidAmount,
            ErrorCode::PasswordTooShort,
            ErrorCode::OrderEmpty,
            ErrorCode::ProductInvalidPrice,
        ] {
            assert_eq!(code.http_status(), StatusCode::BAD_REQUEST);
        }
    }
}
