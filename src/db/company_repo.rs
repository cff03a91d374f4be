// src/db/company_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::company::{Company, CompanyInvitation, CompanyMember},
};

#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Empresas
    // ---

    pub async fn get_company<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
    ) -> Result<Option<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(company_id)
            .fetch_optional(executor)
            .await?;
        Ok(company)
    }

    pub async fn create_company<'e, E>(
        &self,
        executor: E,
        name: &str,
        seat_limit: i32,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>(
            "INSERT INTO companies (name, seat_limit) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(seat_limit)
        .fetch_one(executor)
        .await?;
        Ok(company)
    }

    // ---
    // Assentos
    // ---
    // O contador nunca é lido-e-reescrito no serviço: a checagem do limite e o
    // incremento acontecem na mesma instrução, e o banco serializa as duas
    // aceitações concorrentes que disputam o último assento.

    /// Tenta ocupar um assento. `None` = limite atingido.
    pub async fn try_reserve_seat<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
    ) -> Result<Option<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET active_seats = active_seats + 1
            WHERE id = $1 AND active_seats < seat_limit
            RETURNING *
            "#,
        )
        .bind(company_id)
        .fetch_optional(executor)
        .await?;
        Ok(company)
    }

    /// Libera um assento, sem jamais ficar negativo.
    pub async fn release_seat<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
    ) -> Result<Option<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET active_seats = active_seats - 1
            WHERE id = $1 AND active_seats > 0
            RETURNING *
            "#,
        )
        .bind(company_id)
        .fetch_optional(executor)
        .await?;
        Ok(company)
    }

    // ---
    // Convites
    // ---

    pub async fn create_invitation<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<CompanyInvitation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invitation = sqlx::query_as::<_, CompanyInvitation>(
            r#"
            INSERT INTO company_invitations (company_id, email, token, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(email)
        .bind(token)
        .bind(expires_at)
        .fetch_one(executor)
        .await?;
        Ok(invitation)
    }

    pub async fn get_invitation_by_token<'e, E>(
        &self,
        executor: E,
        token: &str,
    ) -> Result<Option<CompanyInvitation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invitation = sqlx::query_as::<_, CompanyInvitation>(
            "SELECT * FROM company_invitations WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(executor)
        .await?;
        Ok(invitation)
    }

    /// Carimba accepted_at somente se o convite ainda está pendente e dentro
    /// da validade. `None` = ninguém foi carimbado; o serviço então descobre
    /// se o token não existe, expirou ou já tinha sido aceito.
    pub async fn claim_invitation<'e, E>(
        &self,
        executor: E,
        token: &str,
    ) -> Result<Option<CompanyInvitation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invitation = sqlx::query_as::<_, CompanyInvitation>(
            r#"
            UPDATE company_invitations
            SET accepted_at = now()
            WHERE token = $1
              AND accepted_at IS NULL
              AND expires_at > now()
            RETURNING *
            "#,
        )
        .bind(token)
        .fetch_optional(executor)
        .await?;
        Ok(invitation)
    }

    // ---
    // Membros
    // ---

    /// Cria o vínculo de membro. `None` = o usuário já era membro; o serviço
    /// desfaz a transação para não vazar o assento incrementado.
    pub async fn add_member<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        user_id: Uuid,
        invitation_id: Option<Uuid>,
    ) -> Result<Option<CompanyMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = sqlx::query_as::<_, CompanyMember>(
            r#"
            INSERT INTO company_members (company_id, user_id, invitation_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (company_id, user_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(user_id)
        .bind(invitation_id)
        .fetch_optional(executor)
        .await?;
        Ok(member)
    }

    /// Remove o vínculo. Retorna quantas linhas saíram (0 = não era membro).
    pub async fn remove_member<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result =
            sqlx::query("DELETE FROM company_members WHERE company_id = $1 AND user_id = $2")
                .bind(company_id)
                .bind(user_id)
                .execute(executor)
                .await?;
        Ok(result.rows_affected())
    }
}
