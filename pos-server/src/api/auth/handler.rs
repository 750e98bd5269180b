//! Authentication Handlers
//!
//! Handles login, token verification and password changes

use std::time::Duration;

use axum::{Json, extract::State};
use shared::client::{
    ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse, UserInfo, VerifyResponse,
};
use shared::error::ErrorCode;

use crate::auth::{CurrentUser, verify_password};
use crate::core::ServerState;
use crate::db::models::User;
use crate::db::repository::UserRepository;
use crate::security_log;
use crate::utils::time::now_millis;
use crate::utils::validation::validate_password;
use crate::utils::{AppError, AppResult};

/// Fixed delay for failed authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 200;

async fn reject_login(email: &str, reason: &str) -> AppError {
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;
    security_log!("WARN", "login_failed", email = email.to_string(), reason = reason.to_string());
    AppError::invalid_credentials()
}

fn check_password(user: &User, password: &str) -> AppResult<bool> {
    verify_password(password, &user.password_hash)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))
}

/// POST /api/auth/login - 登录
///
/// Unknown email and wrong password return the same error
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let repo = UserRepository::new(state.get_db());
    let email = req.email.trim().to_lowercase();

    let Some(user) = repo.find_by_email(&email).await? else {
        return Err(reject_login(&email, "user_not_found").await);
    };

    if !check_password(&user, &req.password)? {
        return Err(reject_login(&email, "invalid_password").await);
    }

    if !user.is_active {
        security_log!("WARN", "login_disabled", email = email.clone());
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let user_id = user.id_string();
    repo.touch_last_login(&user_id, now_millis()).await?;

    let token = state
        .get_jwt_service()
        .generate_token(&user_id, &user.email, user.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(
        user_id = %user_id,
        email = %user.email,
        role = %user.role.as_str(),
        "User logged in successfully"
    );

    Ok(Json(LoginResponse {
        token,
        user: UserInfo::from(&user),
    }))
}

/// GET /api/auth/verify - 校验令牌并返回当前用户
pub async fn verify(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<VerifyResponse>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_id(&current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    Ok(Json(VerifyResponse {
        user: UserInfo::from(&user),
    }))
}

/// POST /api/auth/change-password - 修改自己的密码
pub async fn change_password(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_id(&current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    if !check_password(&user, &req.current_password)? {
        security_log!("WARN", "change_password_rejected", user_id = current.id.clone());
        return Err(AppError::with_message(
            ErrorCode::InvalidCredentials,
            "Current password is incorrect",
        ));
    }

    validate_password(&req.new_password)?;
    repo.update_password(&current.id, &req.new_password).await?;

    tracing::info!(user_id = %current.id, "Password changed");
    Ok(Json(MessageResponse::new("Password changed successfully")))
}
