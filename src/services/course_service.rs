// src/services/course_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CourseRepository,
    middleware::auth::Actor,
    models::catalog::{Course, Lesson},
    models::commerce::Certificate,
    models::users::UserRole,
    services::moderation,
};

#[derive(Clone)]
pub struct CourseService {
    repo: CourseRepository,
}

impl CourseService {
    pub fn new(repo: CourseRepository) -> Self {
        Self { repo }
    }

    // ---
    // Catálogo
    // ---

    pub async fn create_course<'e, E>(
        &self,
        executor: E,
        actor: &Actor,
        title: &str,
        description: Option<&str>,
        price_cents: i64,
    ) -> Result<Course, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !matches!(actor.role, UserRole::Instructor | UserRole::SuperAdmin) {
            return Err(AppError::Forbidden);
        }

        self.repo
            .create_course(executor, actor.id, title, description, price_cents)
            .await
    }

    pub async fn add_lesson<'e, E>(
        &self,
        executor: E,
        actor: &Actor,
        course_id: Uuid,
        title: &str,
        position: i32,
    ) -> Result<Lesson, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let course = self
            .repo
            .get_course(&mut *tx, course_id)
            .await?
            .ok_or(AppError::CourseNotFound)?;
        if !actor.can_manage_course(course.instructor_id) {
            return Err(AppError::Forbidden);
        }

        let lesson = self.repo.add_lesson(&mut *tx, course_id, title, position).await?;

        tx.commit().await?;
        Ok(lesson)
    }

    pub async fn get_course<'e, E>(
        &self,
        executor: E,
        course_id: Uuid,
    ) -> Result<Course, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .get_course(executor, course_id)
            .await?
            .ok_or(AppError::CourseNotFound)
    }

    pub async fn list_published<'e, E>(&self, executor: E) -> Result<Vec<Course>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_published(executor).await
    }

    pub async fn list_by_instructor<'e, E>(
        &self,
        executor: E,
        instructor_id: Uuid,
    ) -> Result<Vec<Course>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_by_instructor(executor, instructor_id).await
    }

    // ---
    // Moderação
    // ---
    // Cada transição: trava a linha do curso, decide com as regras puras e
    // grava o trio (status, is_published, rejection_reason) num único UPDATE.
    // Ou a transição inteira entra, ou nada entra.

    pub async fn submit<'e, E>(
        &self,
        executor: E,
        actor: &Actor,
        course_id: Uuid,
    ) -> Result<Course, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let course = self
            .repo
            .get_course_for_update(&mut *tx, course_id)
            .await?
            .ok_or(AppError::CourseNotFound)?;
        if !actor.can_manage_course(course.instructor_id) {
            return Err(AppError::Forbidden);
        }

        let lesson_count = self.repo.count_lessons(&mut *tx, course_id).await?;
        let outcome = moderation::submit(&course, lesson_count)?;

        let updated = self
            .repo
            .apply_transition(
                &mut *tx,
                course_id,
                outcome.status,
                outcome.is_published,
                outcome.rejection_reason.as_deref(),
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn approve<'e, E>(
        &self,
        executor: E,
        actor: &Actor,
        course_id: Uuid,
    ) -> Result<Course, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if !actor.is_super_admin() {
            return Err(AppError::Forbidden);
        }

        let mut tx = executor.begin().await?;

        let course = self
            .repo
            .get_course_for_update(&mut *tx, course_id)
            .await?
            .ok_or(AppError::CourseNotFound)?;
        let outcome = moderation::approve(&course)?;

        let updated = self
            .repo
            .apply_transition(
                &mut *tx,
                course_id,
                outcome.status,
                outcome.is_published,
                outcome.rejection_reason.as_deref(),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(course_id = %course_id, "Curso aprovado e publicado");
        Ok(updated)
    }

    pub async fn reject<'e, E>(
        &self,
        executor: E,
        actor: &Actor,
        course_id: Uuid,
        reason: &str,
    ) -> Result<Course, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if !actor.is_super_admin() {
            return Err(AppError::Forbidden);
        }

        let mut tx = executor.begin().await?;

        let course = self
            .repo
            .get_course_for_update(&mut *tx, course_id)
            .await?
            .ok_or(AppError::CourseNotFound)?;
        let outcome = moderation::reject(&course, reason)?;

        let updated = self
            .repo
            .apply_transition(
                &mut *tx,
                course_id,
                outcome.status,
                outcome.is_published,
                outcome.rejection_reason.as_deref(),
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn unpublish<'e, E>(
        &self,
        executor: E,
        actor: &Actor,
        course_id: Uuid,
    ) -> Result<Course, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let course = self
            .repo
            .get_course_for_update(&mut *tx, course_id)
            .await?
            .ok_or(AppError::CourseNotFound)?;
        if !actor.can_manage_course(course.instructor_id) {
            return Err(AppError::Forbidden);
        }

        // Só visibilidade: as matrículas existentes permanecem intactas.
        let outcome = moderation::unpublish(&course)?;

        let updated = self
            .repo
            .apply_transition(
                &mut *tx,
                course_id,
                outcome.status,
                outcome.is_published,
                outcome.rejection_reason.as_deref(),
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn archive<'e, E>(
        &self,
        executor: E,
        actor: &Actor,
        course_id: Uuid,
    ) -> Result<Course, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let course = self
            .repo
            .get_course_for_update(&mut *tx, course_id)
            .await?
            .ok_or(AppError::CourseNotFound)?;
        if !actor.can_manage_course(course.instructor_id) {
            return Err(AppError::Forbidden);
        }

        let outcome = moderation::archive(&course)?;

        let updated = self
            .repo
            .apply_transition(
                &mut *tx,
                course_id,
                outcome.status,
                outcome.is_published,
                outcome.rejection_reason.as_deref(),
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Hard-delete. A pré-condição (não publicado, zero matrículas) é
    /// conferida duas vezes: aqui, para devolver o motivo certo, e dentro do
    /// próprio DELETE condicional — uma matrícula criada entre a checagem e a
    /// exclusão ainda bloqueia, mesmo sem isolamento serializável.
    pub async fn delete<'e, E>(
        &self,
        executor: E,
        actor: &Actor,
        course_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let course = self
            .repo
            .get_course_for_update(&mut *tx, course_id)
            .await?
            .ok_or(AppError::CourseNotFound)?;
        if !actor.can_manage_course(course.instructor_id) {
            return Err(AppError::Forbidden);
        }

        let enrollment_count = self.repo.count_enrollments(&mut *tx, course_id).await?;
        moderation::can_delete(&course, enrollment_count)?;

        let deleted = self
            .repo
            .delete_course_if_unreferenced(&mut *tx, course_id)
            .await?;
        if deleted == 0 {
            // A janela entre a checagem e o DELETE foi perdida para uma
            // matrícula concorrente. Acesso pago nunca some em silêncio.
            return Err(AppError::DeleteBlocked {
                reason: "has_enrollments",
            });
        }

        tx.commit().await?;

        tracing::info!(course_id = %course_id, "Curso excluído definitivamente");
        Ok(())
    }

    // ---
    // Certificados
    // ---

    /// Emite o certificado do próprio ator para um curso em que está
    /// matriculado. Reemissão é idempotente.
    pub async fn issue_certificate<'e, E>(
        &self,
        executor: E,
        actor: &Actor,
        course_id: Uuid,
    ) -> Result<Certificate, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let enrollment = self
            .repo
            .get_enrollment(&mut *tx, actor.id, course_id)
            .await?
            .ok_or(AppError::EnrollmentNotFound)?;

        let certificate = self.repo.create_certificate(&mut *tx, enrollment.id).await?;

        tx.commit().await?;
        Ok(certificate)
    }
}
