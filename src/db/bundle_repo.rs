// src/db/bundle_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::commerce::Bundle};

// Linha auxiliar para buscar preços dos cursos membros.
#[derive(Debug, sqlx::FromRow)]
pub struct CoursePriceRow {
    pub id: Uuid,
    pub price_cents: i64,
}

#[derive(Clone)]
pub struct BundleRepository {
    pool: PgPool,
}

impl BundleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---

    pub async fn get_bundle<'e, E>(
        &self,
        executor: E,
        bundle_id: Uuid,
    ) -> Result<Option<Bundle>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bundle = sqlx::query_as::<_, Bundle>("SELECT * FROM bundles WHERE id = $1")
            .bind(bundle_id)
            .fetch_optional(executor)
            .await?;
        Ok(bundle)
    }

    /// Busca o pacote travando a linha (FOR UPDATE): duas edições
    /// concorrentes do mesmo pacote ficam serializadas e nunca persistem
    /// composição e preço em desacordo.
    pub async fn get_bundle_for_update<'e, E>(
        &self,
        executor: E,
        bundle_id: Uuid,
    ) -> Result<Option<Bundle>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bundle =
            sqlx::query_as::<_, Bundle>("SELECT * FROM bundles WHERE id = $1 FOR UPDATE")
                .bind(bundle_id)
                .fetch_optional(executor)
                .await?;
        Ok(bundle)
    }

    pub async fn list_active<'e, E>(&self, executor: E) -> Result<Vec<Bundle>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bundles = sqlx::query_as::<_, Bundle>(
            "SELECT * FROM bundles WHERE is_active = true ORDER BY title ASC",
        )
        .fetch_all(executor)
        .await?;
        Ok(bundles)
    }

    pub async fn get_member_course_ids<'e, E>(
        &self,
        executor: E,
        bundle_id: Uuid,
    ) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT course_id FROM bundle_courses WHERE bundle_id = $1 ORDER BY position ASC",
        )
        .bind(bundle_id)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }

    /// Busca os preços atuais dos cursos informados. O chamador confere se
    /// todos existem; a busca dentro da transação do pacote garante que o
    /// preço gravado corresponde à composição gravada.
    pub async fn fetch_course_prices<'e, E>(
        &self,
        executor: E,
        course_ids: &[Uuid],
    ) -> Result<Vec<CoursePriceRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, CoursePriceRow>(
            "SELECT id, price_cents FROM courses WHERE id = ANY($1)",
        )
        .bind(course_ids)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    // ---
    // Funções de "Escrita" (sempre dentro da transação do serviço)
    // ---

    pub async fn insert_bundle<'e, E>(
        &self,
        executor: E,
        title: &str,
        original_price_cents: i64,
        discount_percent: i32,
        price_cents: i64,
        is_active: bool,
    ) -> Result<Bundle, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bundle = sqlx::query_as::<_, Bundle>(
            r#"
            INSERT INTO bundles (title, original_price_cents, discount_percent, price_cents, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(original_price_cents)
        .bind(discount_percent)
        .bind(price_cents)
        .bind(is_active)
        .fetch_one(executor)
        .await?;
        Ok(bundle)
    }

    pub async fn update_bundle<'e, E>(
        &self,
        executor: E,
        bundle_id: Uuid,
        title: &str,
        original_price_cents: i64,
        discount_percent: i32,
        price_cents: i64,
        is_active: bool,
    ) -> Result<Bundle, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bundle = sqlx::query_as::<_, Bundle>(
            r#"
            UPDATE bundles
            SET title = $2,
                original_price_cents = $3,
                discount_percent = $4,
                price_cents = $5,
                is_active = $6,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(bundle_id)
        .bind(title)
        .bind(original_price_cents)
        .bind(discount_percent)
        .bind(price_cents)
        .bind(is_active)
        .fetch_one(executor)
        .await?;
        Ok(bundle)
    }

    pub async fn delete_members<'e, E>(
        &self,
        executor: E,
        bundle_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM bundle_courses WHERE bundle_id = $1")
            .bind(bundle_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn add_member<'e, E>(
        &self,
        executor: E,
        bundle_id: Uuid,
        course_id: Uuid,
        position: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "INSERT INTO bundle_courses (bundle_id, course_id, position) VALUES ($1, $2, $3)",
        )
        .bind(bundle_id)
        .bind(course_id)
        .bind(position)
        .execute(executor)
        .await?;
        Ok(())
    }
}
