// src/models/catalog.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

// Ciclo editorial do curso. `is_published` é um campo derivado: só pode ser
// true quando o status é Approved (ou Published, para catálogos importados).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "course_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    Draft,     // Em edição pelo instrutor
    Pending,   // Aguardando moderação
    Approved,  // Aprovado pela moderação
    Rejected,  // Devolvido com motivo
    Published, // Legado de importação; tratado como aprovado
    Archived,  // Fora do ar, reversível via nova aprovação
}

impl CourseStatus {
    // Estados compatíveis com is_published = true.
    pub fn allows_publish_flag(&self) -> bool {
        matches!(self, CourseStatus::Approved | CourseStatus::Published)
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,

    pub instructor_id: Uuid,

    #[schema(example = "Rust para Backend")]
    pub title: String,

    pub description: Option<String>,

    #[schema(example = 14900)]
    pub price_cents: i64,

    pub status: CourseStatus,

    pub is_published: bool,

    pub rejection_reason: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: Uuid,

    pub course_id: Uuid,

    #[schema(example = "Aula 1 - Ownership")]
    pub title: String,

    pub position: i32,

    pub created_at: DateTime<Utc>,
}
