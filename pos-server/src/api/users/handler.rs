//! User API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::client::MessageResponse;
use shared::error::ErrorCode;
use shared::models::UserRole;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{User, UserCreate, UserResponse, UserUpdate};
use crate::db::repository::{RepoError, UserRepository};
use crate::utils::validation::{
    MAX_NAME_LEN, normalize_email, validate_password, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// Max entries returned by the activity feed
const ACTIVITY_LIMIT: usize = 20;

fn user_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::UserNotFound, format!("User {} not found", id))
}

fn map_user_error(err: RepoError) -> AppError {
    match err {
        RepoError::NotFound(msg) => AppError::with_message(ErrorCode::UserNotFound, msg),
        RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::UserEmailExists, msg),
        other => other.into(),
    }
}

/// GET /api/users - 获取所有用户
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<UserResponse>>> {
    let repo = UserRepository::new(state.get_db());
    let users = repo.find_all().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/users/activity - 最近登录的用户
pub async fn activity(State(state): State<ServerState>) -> AppResult<Json<Vec<UserResponse>>> {
    let repo = UserRepository::new(state.get_db());
    let users = repo.find_recent_logins(ACTIVITY_LIMIT).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// POST /api/users - 创建用户 (默认角色 cashier)
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<UserResponse>> {
    let email = normalize_email(&payload.email)?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_password(&payload.password)?;
    let role = payload.role.unwrap_or(UserRole::Cashier);

    let repo = UserRepository::new(state.get_db());
    let user = repo
        .create(email, &payload.password, payload.name.trim().to_string(), role)
        .await
        .map_err(map_user_error)?;

    tracing::info!(
        user_id = %user.id_string(),
        email = %user.email,
        role = %user.role.as_str(),
        created_by = %current.id,
        "User created"
    );
    Ok(Json(UserResponse::from(user)))
}

fn is_bootstrap_admin(state: &ServerState, user: &User) -> bool {
    user.email == state.config.default_admin.email.trim().to_lowercase()
}

/// PUT /api/users/{id} - 更新用户
///
/// 默认管理员不可改邮箱、降级或停用; 当前用户不可停用或降级自己
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(mut payload): Json<UserUpdate>,
) -> AppResult<Json<UserResponse>> {
    if let Some(email) = &payload.email {
        payload.email = Some(normalize_email(email)?);
    }
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
        payload.name = Some(name.trim().to_string());
    }

    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| user_not_found(&id))?;

    let email_changed = payload.email.as_ref().is_some_and(|e| *e != user.email);
    let deactivated = payload.is_active == Some(false);
    let demoted = payload.role.is_some_and(|r| r != UserRole::Admin) && user.role == UserRole::Admin;

    if is_bootstrap_admin(&state, &user) && (email_changed || deactivated || demoted) {
        return Err(AppError::new(ErrorCode::CannotModifyAdmin));
    }
    let user_id = user.id_string();
    if user_id == current.id && (deactivated || demoted) {
        return Err(AppError::new(ErrorCode::UserCannotDemoteSelf));
    }

    let user = repo.update(&user_id, payload).await.map_err(map_user_error)?;

    tracing::info!(user_id = %user_id, updated_by = %current.id, "User updated");
    Ok(Json(UserResponse::from(user)))
}

/// DELETE /api/users/{id} - 删除用户
///
/// 默认管理员和当前登录用户不可删除
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| user_not_found(&id))?;

    if is_bootstrap_admin(&state, &user) {
        return Err(AppError::new(ErrorCode::CannotDeleteAdmin));
    }

    let user_id = user.id_string();
    if user_id == current.id {
        return Err(AppError::new(ErrorCode::UserCannotDeleteSelf));
    }

    if !repo.delete(&user_id).await? {
        return Err(user_not_found(&id));
    }

    tracing::info!(user_id = %user_id, deleted_by = %current.id, "User deleted");
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
