// src/db/order_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::commerce::{Order, OrderItem, Payment, PaymentStatus},
};

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---

    pub async fn get_order<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    pub async fn list_items<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<OrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items =
            sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = $1")
                .bind(order_id)
                .fetch_all(executor)
                .await?;
        Ok(items)
    }

    pub async fn get_payment<'e, E>(
        &self,
        executor: E,
        payment_id: Uuid,
    ) -> Result<Option<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(payment_id)
            .fetch_optional(executor)
            .await?;
        Ok(payment)
    }

    // ---
    // Funções de "Escrita"
    // ---

    pub async fn create_order<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order =
            sqlx::query_as::<_, Order>("INSERT INTO orders (user_id) VALUES ($1) RETURNING *")
                .bind(user_id)
                .fetch_one(executor)
                .await?;
        Ok(order)
    }

    /// Itens são imutáveis após a criação do pedido: ou curso, ou pacote.
    /// O CHECK do banco garante a exclusividade mesmo se o serviço errar.
    pub async fn add_item<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        course_id: Option<Uuid>,
        bundle_id: Option<Uuid>,
    ) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (order_id, course_id, bundle_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(course_id)
        .bind(bundle_id)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn create_payment<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        amount_cents: i64,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (order_id, amount_cents)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(amount_cents)
        .fetch_one(executor)
        .await?;
        Ok(payment)
    }

    /// Troca de status condicional, numa única instrução: só sai de
    /// `expected` para `next`. Duas confirmações simultâneas do mesmo
    /// pagamento resultam em exatamente uma troca bem-sucedida.
    pub async fn transition_payment<'e, E>(
        &self,
        executor: E,
        payment_id: Uuid,
        expected: PaymentStatus,
        next: PaymentStatus,
    ) -> Result<Option<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stamp_paid_at = matches!(next, PaymentStatus::Succeeded);

        let payment = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET status = $3,
                paid_at = CASE WHEN $4 THEN now() ELSE paid_at END
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(payment_id)
        .bind(expected)
        .bind(next)
        .bind(stamp_paid_at)
        .fetch_optional(executor)
        .await?;
        Ok(payment)
    }
}
