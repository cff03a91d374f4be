// src/handlers/bundles.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, config::AppState, middleware::auth::Actor};

// ---
// Payload: CreateBundle / UpdateBundle
// ---
// O preço nunca vem no payload: é sempre recalculado da composição + desconto.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BundlePayload {
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,

    #[validate(length(min = 1, message = "O pacote precisa de pelo menos um curso."))]
    pub course_ids: Vec<Uuid>,

    // Opcional: vence a faixa automática. Fora de 0-100 a chamada é rejeitada.
    pub discount_percent: Option<i32>,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Cria um pacote com preço derivado dos cursos membros.
#[utoipa::path(
    post,
    path = "/api/bundles",
    request_body = BundlePayload,
    responses((status = 201, body = crate::models::commerce::BundleDetail), (status = 400)),
    tag = "Bundles",
    security(("api_jwt" = []))
)]
pub async fn create_bundle(
    State(app_state): State<AppState>,
    actor: Actor,
    Json(payload): Json<BundlePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let detail = app_state
        .bundle_service
        .create_bundle(
            &app_state.db_pool,
            &actor,
            &payload.title,
            &payload.course_ids,
            payload.discount_percent,
            payload.is_active,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

/// Atualiza composição/desconto/título e recalcula o preço, tudo atômico.
#[utoipa::path(
    put,
    path = "/api/bundles/{id}",
    params(("id" = Uuid, Path, description = "Id do pacote")),
    request_body = BundlePayload,
    responses((status = 200, body = crate::models::commerce::BundleDetail), (status = 404)),
    tag = "Bundles",
    security(("api_jwt" = []))
)]
pub async fn update_bundle(
    State(app_state): State<AppState>,
    actor: Actor,
    Path(bundle_id): Path<Uuid>,
    Json(payload): Json<BundlePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let detail = app_state
        .bundle_service
        .update_bundle(
            &app_state.db_pool,
            &actor,
            bundle_id,
            &payload.title,
            &payload.course_ids,
            payload.discount_percent,
            payload.is_active,
        )
        .await?;

    Ok((StatusCode::OK, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/api/bundles",
    responses((status = 200, body = [crate::models::commerce::Bundle])),
    tag = "Bundles",
    security(("api_jwt" = []))
)]
pub async fn list_bundles(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let bundles = app_state
        .bundle_service
        .list_active(&app_state.db_pool)
        .await?;
    Ok((StatusCode::OK, Json(bundles)))
}

#[utoipa::path(
    get,
    path = "/api/bundles/{id}",
    params(("id" = Uuid, Path, description = "Id do pacote")),
    responses((status = 200, body = crate::models::commerce::BundleDetail), (status = 404)),
    tag = "Bundles",
    security(("api_jwt" = []))
)]
pub async fn get_bundle(
    State(app_state): State<AppState>,
    Path(bundle_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state
        .bundle_service
        .get_detail(&app_state.db_pool, bundle_id)
        .await?;
    Ok((StatusCode::OK, Json(detail)))
}
