// src/models/company.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// active_seats é um contador corrente (nunca recalculado por varredura),
// mutado apenas por incremento/decremento condicional no banco.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,

    #[schema(example = "Acme Treinamentos")]
    pub name: String,

    #[schema(example = 50)]
    pub seat_limit: i32,

    #[schema(example = 12)]
    pub active_seats: i32,

    pub created_at: DateTime<Utc>,
}

// accepted_at = NULL significa pendente. A aceitação acontece uma única vez.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInvitation {
    pub id: Uuid,
    pub company_id: Uuid,

    #[schema(example = "joao@acme.com")]
    pub email: String,

    pub token: String,

    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyMember {
    pub company_id: Uuid,
    pub user_id: Uuid,
    pub invitation_id: Option<Uuid>,
    pub joined_at: DateTime<Utc>,
}
