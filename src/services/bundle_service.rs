// src/services/bundle_service.rs

use std::collections::{HashMap, HashSet};

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::BundleRepository,
    middleware::auth::Actor,
    models::commerce::{Bundle, BundleDetail},
    services::pricing::{self, field_error},
};

#[derive(Clone)]
pub struct BundleService {
    repo: BundleRepository,
}

impl BundleService {
    pub fn new(repo: BundleRepository) -> Self {
        Self { repo }
    }

    // ---
    // Leitura
    // ---

    pub async fn list_active<'e, E>(&self, executor: E) -> Result<Vec<Bundle>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_active(executor).await
    }

    pub async fn get_detail<'e, E>(
        &self,
        executor: E,
        bundle_id: Uuid,
    ) -> Result<BundleDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let bundle = self
            .repo
            .get_bundle(&mut *tx, bundle_id)
            .await?
            .ok_or(AppError::BundleNotFound)?;
        let course_ids = self.repo.get_member_course_ids(&mut *tx, bundle_id).await?;

        tx.commit().await?;
        Ok(BundleDetail { bundle, course_ids })
    }

    // ---
    // Escrita
    // ---
    // Composição e preço mudam sempre juntos, na mesma transação: lê os
    // preços atuais dos membros, recalcula a cotação e grava tudo. Nenhum
    // estado intermediário (composição nova com preço velho) é persistível.

    pub async fn create_bundle<'e, E>(
        &self,
        executor: E,
        actor: &Actor,
        title: &str,
        course_ids: &[Uuid],
        override_discount_percent: Option<i32>,
        is_active: bool,
    ) -> Result<BundleDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if !actor.is_super_admin() {
            return Err(AppError::Forbidden);
        }

        let mut tx = executor.begin().await?;

        let quote = self
            .quote_members(&mut tx, course_ids, override_discount_percent)
            .await?;

        let bundle = self
            .repo
            .insert_bundle(
                &mut *tx,
                title,
                quote.original_price_cents,
                quote.discount_percent,
                quote.final_price_cents,
                is_active,
            )
            .await?;

        for (position, course_id) in course_ids.iter().enumerate() {
            self.repo
                .add_member(&mut *tx, bundle.id, *course_id, position as i32)
                .await?;
        }

        tx.commit().await?;

        Ok(BundleDetail {
            bundle,
            course_ids: course_ids.to_vec(),
        })
    }

    pub async fn update_bundle<'e, E>(
        &self,
        executor: E,
        actor: &Actor,
        bundle_id: Uuid,
        title: &str,
        course_ids: &[Uuid],
        override_discount_percent: Option<i32>,
        is_active: bool,
    ) -> Result<BundleDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if !actor.is_super_admin() {
            return Err(AppError::Forbidden);
        }

        let mut tx = executor.begin().await?;

        // Trava o pacote: edições concorrentes ficam em fila.
        self.repo
            .get_bundle_for_update(&mut *tx, bundle_id)
            .await?
            .ok_or(AppError::BundleNotFound)?;

        let quote = self
            .quote_members(&mut tx, course_ids, override_discount_percent)
            .await?;

        self.repo.delete_members(&mut *tx, bundle_id).await?;
        for (position, course_id) in course_ids.iter().enumerate() {
            self.repo
                .add_member(&mut *tx, bundle_id, *course_id, position as i32)
                .await?;
        }

        let bundle = self
            .repo
            .update_bundle(
                &mut *tx,
                bundle_id,
                title,
                quote.original_price_cents,
                quote.discount_percent,
                quote.final_price_cents,
                is_active,
            )
            .await?;

        tx.commit().await?;

        Ok(BundleDetail {
            bundle,
            course_ids: course_ids.to_vec(),
        })
    }

    // Valida a composição e calcula a cotação com os preços lidos dentro da
    // transação do chamador.
    async fn quote_members(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        course_ids: &[Uuid],
        override_discount_percent: Option<i32>,
    ) -> Result<pricing::BundleQuote, AppError> {
        let unique: HashSet<Uuid> = course_ids.iter().copied().collect();
        if unique.len() != course_ids.len() {
            return Err(field_error(
                "courseIds",
                "duplicate",
                "Um curso não pode aparecer duas vezes no mesmo pacote.",
            ));
        }

        let price_rows = self.repo.fetch_course_prices(&mut **tx, course_ids).await?;
        let prices_by_id: HashMap<Uuid, i64> = price_rows
            .into_iter()
            .map(|row| (row.id, row.price_cents))
            .collect();

        // Preserva a ordem informada; qualquer id desconhecido derruba tudo.
        let mut prices = Vec::with_capacity(course_ids.len());
        for course_id in course_ids {
            let price = prices_by_id
                .get(course_id)
                .ok_or(AppError::CourseNotFound)?;
            prices.push(*price);
        }

        pricing::compute_bundle_price(&prices, override_discount_percent)
    }
}
