// src/services/company_service.rs

use chrono::{Duration, Utc};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CompanyRepository,
    middleware::auth::Actor,
    models::company::{Company, CompanyInvitation, CompanyMember},
};

// Livro-razão de assentos. O contador active_seats nunca é lido-e-reescrito
// aqui: checagem de limite e incremento acontecem na mesma instrução SQL, e
// o banco arbitra as aceitações concorrentes.
#[derive(Clone)]
pub struct CompanyService {
    repo: CompanyRepository,
    invitation_ttl: Duration,
}

impl CompanyService {
    pub fn new(repo: CompanyRepository, invitation_ttl_days: i64) -> Self {
        Self {
            repo,
            invitation_ttl: Duration::days(invitation_ttl_days),
        }
    }

    pub async fn create_company<'e, E>(
        &self,
        executor: E,
        actor: &Actor,
        name: &str,
        seat_limit: i32,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !actor.is_super_admin() {
            return Err(AppError::Forbidden);
        }
        self.repo.create_company(executor, name, seat_limit).await
    }

    pub async fn get_company<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .get_company(executor, company_id)
            .await?
            .ok_or(AppError::CompanyNotFound)
    }

    /// Emite um convite com token opaco e validade configurada (padrão 7
    /// dias). O envio do e-mail é responsabilidade do colaborador externo.
    pub async fn create_invitation<'e, E>(
        &self,
        executor: E,
        actor: &Actor,
        company_id: Uuid,
        email: &str,
    ) -> Result<CompanyInvitation, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if !actor.is_super_admin() {
            return Err(AppError::Forbidden);
        }

        let mut tx = executor.begin().await?;

        self.repo
            .get_company(&mut *tx, company_id)
            .await?
            .ok_or(AppError::CompanyNotFound)?;

        let token = Uuid::new_v4().simple().to_string();
        let expires_at = Utc::now() + self.invitation_ttl;

        let invitation = self
            .repo
            .create_invitation(&mut *tx, company_id, email, &token, expires_at)
            .await?;

        tx.commit().await?;
        Ok(invitation)
    }

    /// Aceita um convite e ocupa um assento, tudo ou nada:
    /// 1. carimba accepted_at (condicional: pendente e dentro da validade);
    /// 2. incrementa active_seats (condicional: abaixo do limite);
    /// 3. cria o vínculo de membro.
    /// Qualquer falha desfaz a transação inteira — o convite volta a
    /// pendente e nenhum assento fica ocupado. Com um assento restante e
    /// duas aceitações simultâneas, exatamente uma comita.
    pub async fn accept_invitation<'e, E>(
        &self,
        executor: E,
        actor: &Actor,
        token: &str,
    ) -> Result<CompanyMember, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let invitation = match self.repo.claim_invitation(&mut *tx, token).await? {
            Some(invitation) => invitation,
            None => {
                // Nada foi carimbado: token inexistente, expirado ou repetido.
                return Err(match self.repo.get_invitation_by_token(&mut *tx, token).await? {
                    None => AppError::InvalidInvitationToken,
                    Some(inv) if inv.accepted_at.is_some() => {
                        AppError::InvitationAlreadyAccepted
                    }
                    Some(_) => AppError::InvitationExpired,
                });
            }
        };

        self.repo
            .try_reserve_seat(&mut *tx, invitation.company_id)
            .await?
            .ok_or(AppError::SeatLimitReached)?;

        let member = self
            .repo
            .add_member(&mut *tx, invitation.company_id, actor.id, Some(invitation.id))
            .await?
            .ok_or(AppError::AlreadyCompanyMember)?;

        tx.commit().await?;

        tracing::info!(
            company_id = %invitation.company_id,
            user_id = %actor.id,
            "Convite aceito, assento ocupado"
        );
        Ok(member)
    }

    /// Remove o membro e libera o assento na mesma transação.
    pub async fn remove_member<'e, E>(
        &self,
        executor: E,
        actor: &Actor,
        company_id: Uuid,
        user_id: Uuid,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if !actor.is_super_admin() {
            return Err(AppError::Forbidden);
        }

        let mut tx = executor.begin().await?;

        let removed = self.repo.remove_member(&mut *tx, company_id, user_id).await?;
        if removed == 0 {
            return Err(AppError::MemberNotFound);
        }

        let company = self
            .repo
            .release_seat(&mut *tx, company_id)
            .await?
            .ok_or(AppError::CompanyNotFound)?;

        tx.commit().await?;
        Ok(company)
    }
}
