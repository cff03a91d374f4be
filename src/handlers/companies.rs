// src/handlers/companies.rs

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
// Payload: CreateCompany
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(range(min = 1, message = "O plano precisa de pelo menos um assento."))]
    pub seat_limit: i32,
}

#[utoipa::path(
    post,
    path = "/api/companies",
    request_body = CreateCompanyPayload,
    responses((status = 201, body = crate::models::company::Company)),
    tag = "Companies",
    security(("api_jwt" = []))
)]
pub async fn create_company(
    State(app_state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateCompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let company = app_state
        .company_service
        .create_company(&app_state.db_pool, &actor, &payload.name, payload.seat_limit)
        .await?;

    Ok((StatusCode::CREATED, Json(company)))
}

#[utoipa::path(
    get,
    path = "/api/companies/{id}",
    params(("id" = Uuid, Path, description = "Id da empresa")),
    responses((status = 200, body = crate::models::company::Company), (status = 404)),
    tag = "Companies",
    security(("api_jwt" = []))
)]
pub async fn get_company(
    State(app_state): State<AppState>,
    _actor: Actor,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state
        .company_service
        .get_company(&app_state.db_pool, company_id)
        .await?;
    Ok((StatusCode::OK, Json(company)))
}

// ---
// Payload: CreateInvitation
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitationPayload {
    #[validate(email(message = "E-mail inválido."))]
    pub email: String,
}

/// Emite um convite com token opaco (validade padrão de 7 dias).
#[utoipa::path(
    post,
    path = "/api/companies/{id}/invitations",
    params(("id" = Uuid, Path, description = "Id da empresa")),
    request_body = CreateInvitationPayload,
    responses((status = 201, body = crate::models::company::CompanyInvitation)),
    tag = "Companies",
    security(("api_jwt" = []))
)]
pub async fn create_invitation(
    State(app_state): State<AppState>,
    actor: Actor,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<CreateInvitationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let invitation = app_state
        .company_service
        .create_invitation(&app_state.db_pool, &actor, company_id, &payload.email)
        .await?;

    Ok((StatusCode::CREATED, Json(invitation)))
}

// ---
// Payload: AcceptInvitation
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitationPayload {
    #[validate(length(min = 1, message = "O token é obrigatório."))]
    pub token: String,
}

/// Aceita um convite e ocupa um assento da empresa, tudo ou nada.
#[utoipa::path(
    post,
    path = "/api/invitations/accept",
    request_body = AcceptInvitationPayload,
    responses(
        (status = 200, body = crate::models::company::CompanyMember),
        (status = 404),
        (status = 409),
        (status = 410)
    ),
    tag = "Companies",
    security(("api_jwt" = []))
)]
pub async fn accept_invitation(
    State(app_state): State<AppState>,
    actor: Actor,
    Json(payload): Json<AcceptInvitationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let member = app_state
        .company_service
        .accept_invitation(&app_state.db_pool, &actor, &payload.token)
        .await?;

    Ok((StatusCode::OK, Json(member)))
}

/// Desliga o membro e libera o assento na mesma transação.
#[utoipa::path(
    delete,
    path = "/api/companies/{id}/members/{user_id}",
    params(
        ("id" = Uuid, Path, description = "Id da empresa"),
        ("user_id" = Uuid, Path, description = "Id do usuário")
    ),
    responses((status = 200, body = crate::models::company::Company), (status = 404)),
    tag = "Companies",
    security(("api_jwt" = []))
)]
pub async fn remove_member(
    State(app_state): State<AppState>,
    actor: Actor,
    Path((company_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state
        .company_service
        .remove_member(&app_state.db_pool, &actor, company_id, user_id)
        .await?;
    Ok((StatusCode::OK, Json(company)))
}
