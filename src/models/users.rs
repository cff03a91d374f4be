// src/models/users.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Papel do ator, carregado no JWT emitido pelo provedor de autenticação.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    Instructor,
    SuperAdmin,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    #[schema(example = "maria@exemplo.com")]
    pub email: String,

    #[schema(example = "Maria Silva")]
    pub name: String,

    pub role: UserRole,

    pub created_at: DateTime<Utc>,
}
