// src/models/analytics.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::commerce::PaymentStatus;

// --- DTOs de snapshot (entrada da atribuição de receita) ---
// A forma das junções é validada uma vez, na borda de acesso a dados;
// a regra de negócio só enxerga estes tipos.

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentRecord {
    pub order_id: Uuid,
    pub amount_cents: i64,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItemRecord {
    pub order_id: Uuid,
    pub course_id: Option<Uuid>,
    pub bundle_id: Option<Uuid>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BundleMemberRecord {
    pub bundle_id: Uuid,
    pub course_id: Uuid,
}

// Receita atribuída por curso. Mapa fechado: curso sem receita não aparece.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseRevenueEntry {
    pub course_id: Uuid,

    #[schema(example = 1600)]
    pub revenue_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub courses: Vec<CourseRevenueEntry>,

    // Receita de itens que não puderam ser atribuídos (ex.: pacote que
    // perdeu todos os cursos membros). Exposta para auditoria.
    #[schema(example = 0)]
    pub unattributed_cents: i64,

    #[schema(example = 4800)]
    pub total_recognized_cents: i64,
}

// Um ponto da série mensal. A série é sempre densa: mês sem evento vale 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    #[schema(example = "2026-03")]
    pub month: String,

    #[schema(example = 4800)]
    pub value: i64,
}

// Painel dos últimos 6 meses (mês corrente incluído), ordem cronológica.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOverview {
    pub revenue: Vec<MonthBucket>,
    pub signups: Vec<MonthBucket>,
    pub enrollments: Vec<MonthBucket>,
    pub certificates: Vec<MonthBucket>,
}
