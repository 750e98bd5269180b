//! `CurrentUser` extractor
//!
//! [`require_auth`](super::require_auth) validates the token and stores the
//! user in the request extensions; handlers take `current: CurrentUser`.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::CurrentUser;
use crate::utils::AppError;

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // 公开路由上没有经过认证中间件
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(AppError::not_authenticated)
    }
}
