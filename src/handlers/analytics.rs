// src/handlers/analytics.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{common::error::AppError, config::AppState, middleware::auth::Actor};

/// Receita atribuída por curso + contador de receita órfã (auditoria).
#[utoipa::path(
    get,
    path = "/api/analytics/revenue",
    responses((status = 200, body = crate::models::analytics::RevenueReport), (status = 403)),
    tag = "Analytics",
    security(("api_jwt" = []))
)]
pub async fn revenue_report(
    State(app_state): State<AppState>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    if !actor.is_super_admin() {
        return Err(AppError::Forbidden);
    }

    let report = app_state
        .analytics_service
        .revenue_report(&app_state.db_pool)
        .await?;
    Ok((StatusCode::OK, Json(report)))
}

/// Painel dos últimos 6 meses: receita, cadastros, matrículas, certificados.
#[utoipa::path(
    get,
    path = "/api/analytics/overview",
    responses((status = 200, body = crate::models::analytics::AnalyticsOverview), (status = 403)),
    tag = "Analytics",
    security(("api_jwt" = []))
)]
pub async fn overview(
    State(app_state): State<AppState>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    if !actor.is_super_admin() {
        return Err(AppError::Forbidden);
    }

    let overview = app_state
        .analytics_service
        .overview(&app_state.db_pool)
        .await?;
    Ok((StatusCode::OK, Json(overview)))
}
