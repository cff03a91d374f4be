// src/handlers/courses.rs

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

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::Actor,
};

// ---
// Payload: CreateCourse
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCoursePayload {
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,

    pub description: Option<String>,

    #[validate(range(min = 0, message = "O preço não pode ser negativo."))]
    #[serde(default)]
    pub price_cents: i64,
}

/// Cria um curso em rascunho, de posse do instrutor autenticado.
#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CreateCoursePayload,
    responses((status = 201, body = crate::models::catalog::Course)),
    tag = "Courses",
    security(("api_jwt" = []))
)]
pub async fn create_course(
    State(app_state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateCoursePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let course = app_state
        .course_service
        .create_course(
            &app_state.db_pool,
            &actor,
            &payload.title,
            payload.description.as_deref(),
            payload.price_cents,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(course)))
}

/// Catálogo: somente cursos no ar.
#[utoipa::path(
    get,
    path = "/api/courses",
    responses((status = 200, body = [crate::models::catalog::Course])),
    tag = "Courses",
    security(("api_jwt" = []))
)]
pub async fn list_courses(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let courses = app_state
        .course_service
        .list_published(&app_state.db_pool)
        .await?;
    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/courses/mine",
    responses((status = 200, body = [crate::models::catalog::Course])),
    tag = "Courses",
    security(("api_jwt" = []))
)]
pub async fn list_my_courses(
    State(app_state): State<AppState>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    let courses = app_state
        .course_service
        .list_by_instructor(&app_state.db_pool, actor.id)
        .await?;
    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Id do curso")),
    responses((status = 200, body = crate::models::catalog::Course), (status = 404)),
    tag = "Courses",
    security(("api_jwt" = []))
)]
pub async fn get_course(
    State(app_state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let course = app_state
        .course_service
        .get_course(&app_state.db_pool, course_id)
        .await?;
    Ok((StatusCode::OK, Json(course)))
}

// ---
// Payload: AddLesson
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddLessonPayload {
    #[validate(length(min = 1, message = "O título da aula é obrigatório."))]
    pub title: String,

    #[serde(default)]
    pub position: i32,
}

#[utoipa::path(
    post,
    path = "/api/courses/{id}/lessons",
    params(("id" = Uuid, Path, description = "Id do curso")),
    request_body = AddLessonPayload,
    responses((status = 201, body = crate::models::catalog::Lesson)),
    tag = "Courses",
    security(("api_jwt" = []))
)]
pub async fn add_lesson(
    State(app_state): State<AppState>,
    actor: Actor,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<AddLessonPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let lesson = app_state
        .course_service
        .add_lesson(
            &app_state.db_pool,
            &actor,
            course_id,
            &payload.title,
            payload.position,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(lesson)))
}

// ---
// Moderação
// ---

/// Envia o rascunho para a fila de moderação.
#[utoipa::path(
    post,
    path = "/api/courses/{id}/submit",
    params(("id" = Uuid, Path, description = "Id do curso")),
    responses((status = 200, body = crate::models::catalog::Course), (status = 400), (status = 409)),
    tag = "Moderation",
    security(("api_jwt" = []))
)]
pub async fn submit_course(
    State(app_state): State<AppState>,
    actor: Actor,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let course = app_state
        .course_service
        .submit(&app_state.db_pool, &actor, course_id)
        .await?;
    Ok((StatusCode::OK, Json(course)))
}

/// Aprova e publica o curso (somente super admin).
#[utoipa::path(
    post,
    path = "/api/courses/{id}/approve",
    params(("id" = Uuid, Path, description = "Id do curso")),
    responses((status = 200, body = crate::models::catalog::Course), (status = 403), (status = 409)),
    tag = "Moderation",
    security(("api_jwt" = []))
)]
pub async fn approve_course(
    State(app_state): State<AppState>,
    actor: Actor,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let course = app_state
        .course_service
        .approve(&app_state.db_pool, &actor, course_id)
        .await?;
    Ok((StatusCode::OK, Json(course)))
}

// ---
// Payload: RejectCourse
// ---
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectCoursePayload {
    // O mínimo de 10 caracteres úteis é conferido pela regra de moderação.
    pub rejection_reason: String,
}

/// Rejeita o curso com motivo obrigatório (somente super admin).
#[utoipa::path(
    post,
    path = "/api/courses/{id}/reject",
    params(("id" = Uuid, Path, description = "Id do curso")),
    request_body = RejectCoursePayload,
    responses((status = 200, body = crate::models::catalog::Course), (status = 400), (status = 403)),
    tag = "Moderation",
    security(("api_jwt" = []))
)]
pub async fn reject_course(
    State(app_state): State<AppState>,
    actor: Actor,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<RejectCoursePayload>,
) -> Result<impl IntoResponse, AppError> {
    let course = app_state
        .course_service
        .reject(&app_state.db_pool, &actor, course_id, &payload.rejection_reason)
        .await?;
    Ok((StatusCode::OK, Json(course)))
}

/// Tira o curso do ar sem tocar nas matrículas existentes.
#[utoipa::path(
    post,
    path = "/api/courses/{id}/unpublish",
    params(("id" = Uuid, Path, description = "Id do curso")),
    responses((status = 200, body = crate::models::catalog::Course), (status = 409)),
    tag = "Moderation",
    security(("api_jwt" = []))
)]
pub async fn unpublish_course(
    State(app_state): State<AppState>,
    actor: Actor,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let course = app_state
        .course_service
        .unpublish(&app_state.db_pool, &actor, course_id)
        .await?;
    Ok((StatusCode::OK, Json(course)))
}

#[utoipa::path(
    post,
    path = "/api/courses/{id}/archive",
    params(("id" = Uuid, Path, description = "Id do curso")),
    responses((status = 200, body = crate::models::catalog::Course)),
    tag = "Moderation",
    security(("api_jwt" = []))
)]
pub async fn archive_course(
    State(app_state): State<AppState>,
    actor: Actor,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let course = app_state
        .course_service
        .archive(&app_state.db_pool, &actor, course_id)
        .await?;
    Ok((StatusCode::OK, Json(course)))
}

/// Hard-delete: só sem publicação e sem nenhuma matrícula.
#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Id do curso")),
    responses((status = 204), (status = 409)),
    tag = "Moderation",
    security(("api_jwt" = []))
)]
pub async fn delete_course(
    State(app_state): State<AppState>,
    actor: Actor,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .course_service
        .delete(&app_state.db_pool, &actor, course_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Certificados
// ---

/// Emite o certificado do aluno autenticado para o curso.
#[utoipa::path(
    post,
    path = "/api/courses/{id}/certificate",
    params(("id" = Uuid, Path, description = "Id do curso")),
    responses((status = 201, body = crate::models::commerce::Certificate), (status = 404)),
    tag = "Courses",
    security(("api_jwt" = []))
)]
pub async fn issue_certificate(
    State(app_state): State<AppState>,
    actor: Actor,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let certificate = app_state
        .course_service
        .issue_certificate(&app_state.db_pool, &actor, course_id)
        .await?;
    Ok((StatusCode::CREATED, Json(certificate)))
}
