// src/db/analytics_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Acquire, Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::analytics::{BundleMemberRecord, OrderItemRecord, PaymentRecord},
};

// Consultas somente-leitura para os relatórios. Nenhuma trava: atribuição e
// agregação são puras e rodam em paralelo sem estado compartilhado.
#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: PgPool,
}

pub struct RevenueSnapshot {
    pub payments: Vec<PaymentRecord>,
    pub order_items: Vec<OrderItemRecord>,
    pub bundle_members: Vec<BundleMemberRecord>,
}

impl AnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lê pagamentos, itens e composição de pacotes numa transação só,
    /// para que a atribuição trabalhe sobre uma foto consistente.
    pub async fn fetch_revenue_snapshot<'e, E>(
        &self,
        executor: E,
    ) -> Result<RevenueSnapshot, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // Só os status que movem receita: succeeded soma, refunded estorna.
        let payments = sqlx::query_as::<_, PaymentRecord>(
            r#"
            SELECT order_id, amount_cents, status, paid_at
            FROM payments
            WHERE status IN ('succeeded', 'refunded')
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let order_items = sqlx::query_as::<_, OrderItemRecord>(
            "SELECT order_id, course_id, bundle_id FROM order_items",
        )
        .fetch_all(&mut *tx)
        .await?;

        let bundle_members = sqlx::query_as::<_, BundleMemberRecord>(
            "SELECT bundle_id, course_id FROM bundle_courses",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(RevenueSnapshot {
            payments,
            order_items,
            bundle_members,
        })
    }

    // ---
    // Séries de eventos para o painel (cada linha = timestamp do evento)
    // ---

    pub async fn fetch_signup_timestamps<'e, E>(
        &self,
        executor: E,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stamps: Vec<DateTime<Utc>> =
            sqlx::query_scalar("SELECT created_at FROM users WHERE created_at >= $1")
                .bind(since)
                .fetch_all(executor)
                .await?;
        Ok(stamps)
    }

    pub async fn fetch_enrollment_timestamps<'e, E>(
        &self,
        executor: E,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stamps: Vec<DateTime<Utc>> =
            sqlx::query_scalar("SELECT created_at FROM enrollments WHERE created_at >= $1")
                .bind(since)
                .fetch_all(executor)
                .await?;
        Ok(stamps)
    }

    pub async fn fetch_certificate_timestamps<'e, E>(
        &self,
        executor: E,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stamps: Vec<DateTime<Utc>> =
            sqlx::query_scalar("SELECT issued_at FROM certificates WHERE issued_at >= $1")
                .bind(since)
                .fetch_all(executor)
                .await?;
        Ok(stamps)
    }
}
