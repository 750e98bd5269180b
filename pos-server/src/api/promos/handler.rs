//! Promo Slide API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::client::MessageResponse;
use shared::error::ErrorCode;

use crate::core::ServerState;
use crate::db::models::{PromoCreate, PromoPatch, PromoSlide, PromoUpdate};
use crate::db::repository::{PromoRepository, RepoError};
use crate::utils::time::now_millis;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

fn promo_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::PromoNotFound, format!("Promo {} not found", id))
}

/// GET /api/promos - 所有促销轮播
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<PromoSlide>>> {
    let slides = PromoRepository::new(state.get_db()).find_all().await?;
    Ok(Json(slides))
}

/// POST /api/promos - 新建促销轮播
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PromoCreate>,
) -> AppResult<Json<PromoSlide>> {
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_required_text(&payload.image, "image", MAX_URL_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    let expiry_date = payload
        .expiry_date
        .map(|d| d.to_millis(state.config.timezone))
        .transpose()?;

    let slide = PromoRepository::new(state.get_db())
        .create(PromoSlide {
            id: None,
            title: payload.title.trim().to_string(),
            description: payload.description,
            image: payload.image.trim().to_string(),
            active: payload.active.unwrap_or(true),
            expiry_date,
            created_at: now_millis(),
        })
        .await?;

    tracing::info!(title = %slide.title, "Promo created");
    Ok(Json(slide))
}

/// PUT /api/promos/{id} - 更新促销轮播 (仅更新提供的字段)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<PromoUpdate>,
) -> AppResult<Json<PromoSlide>> {
    if let Some(title) = &payload.title {
        validate_required_text(title, "title", MAX_NAME_LEN)?;
    }
    if let Some(image) = &payload.image {
        validate_required_text(image, "image", MAX_URL_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let patch = PromoPatch {
        title: payload.title.map(|t| t.trim().to_string()),
        description: payload.description,
        image: payload.image.map(|i| i.trim().to_string()),
        active: payload.active,
        expiry_date: payload
            .expiry_date
            .map(|d| d.to_millis(state.config.timezone))
            .transpose()?,
    };

    let slide = PromoRepository::new(state.get_db())
        .update(&id, patch)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => promo_not_found(&id),
            other => other.into(),
        })?;
    Ok(Json(slide))
}

/// DELETE /api/promos/{id} - 删除促销轮播
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    if !PromoRepository::new(state.get_db()).delete(&id).await? {
        return Err(promo_not_found(&id));
    }
    tracing::info!(promo_id = %id, "Promo deleted");
    Ok(Json(MessageResponse::new("Slide removed")))
}
