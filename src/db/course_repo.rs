// src/db/course_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{Course, CourseStatus, Lesson},
    models::commerce::{Certificate, Enrollment},
};

#[derive(Clone)]
pub struct CourseRepository {
    pool: PgPool,
}

impl CourseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---

    pub async fn get_course<'e, E>(
        &self,
        executor: E,
        course_id: Uuid,
    ) -> Result<Option<Course>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let course = sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(executor)
            .await?;
        Ok(course)
    }

    /// Busca o curso travando a linha (FOR UPDATE). Usada pelas transições de
    /// moderação para serializar decisões concorrentes sobre o mesmo curso.
    pub async fn get_course_for_update<'e, E>(
        &self,
        executor: E,
        course_id: Uuid,
    ) -> Result<Option<Course>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let course =
            sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1 FOR UPDATE")
                .bind(course_id)
                .fetch_optional(executor)
                .await?;
        Ok(course)
    }

    pub async fn list_published<'e, E>(&self, executor: E) -> Result<Vec<Course>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let courses = sqlx::query_as::<_, Course>(
            "SELECT * FROM courses WHERE is_published = true ORDER BY title ASC",
        )
        .fetch_all(executor)
        .await?;
        Ok(courses)
    }

    pub async fn list_by_instructor<'e, E>(
        &self,
        executor: E,
        instructor_id: Uuid,
    ) -> Result<Vec<Course>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let courses = sqlx::query_as::<_, Course>(
            "SELECT * FROM courses WHERE instructor_id = $1 ORDER BY created_at DESC",
        )
        .bind(instructor_id)
        .fetch_all(executor)
        .await?;
        Ok(courses)
    }

    pub async fn count_lessons<'e, E>(
        &self,
        executor: E,
        course_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM lessons WHERE course_id = $1")
                .bind(course_id)
                .fetch_one(executor)
                .await?;
        Ok(count)
    }

    pub async fn count_enrollments<'e, E>(
        &self,
        executor: E,
        course_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE course_id = $1")
                .bind(course_id)
                .fetch_one(executor)
                .await?;
        Ok(count)
    }

    // ---
    // Funções de "Escrita"
    // ---

    pub async fn create_course<'e, E>(
        &self,
        executor: E,
        instructor_id: Uuid,
        title: &str,
        description: Option<&str>,
        price_cents: i64,
    ) -> Result<Course, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let course = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (instructor_id, title, description, price_cents)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(instructor_id)
        .bind(title)
        .bind(description)
        .bind(price_cents)
        .fetch_one(executor)
        .await?;
        Ok(course)
    }

    pub async fn add_lesson<'e, E>(
        &self,
        executor: E,
        course_id: Uuid,
        title: &str,
        position: i32,
    ) -> Result<Lesson, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lesson = sqlx::query_as::<_, Lesson>(
            r#"
            INSERT INTO lessons (course_id, title, position)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(course_id)
        .bind(title)
        .bind(position)
        .fetch_one(executor)
        .await?;
        Ok(lesson)
    }

    /// Grava o resultado de uma transição de moderação.
    /// status, is_published e rejection_reason mudam juntos, num único UPDATE:
    /// ou a transição inteira persiste, ou nada persiste.
    pub async fn apply_transition<'e, E>(
        &self,
        executor: E,
        course_id: Uuid,
        status: CourseStatus,
        is_published: bool,
        rejection_reason: Option<&str>,
    ) -> Result<Course, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let course = sqlx::query_as::<_, Course>(
            r#"
            UPDATE courses
            SET status = $2,
                is_published = $3,
                rejection_reason = $4,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(course_id)
        .bind(status)
        .bind(is_published)
        .bind(rejection_reason)
        .fetch_one(executor)
        .await?;
        Ok(course)
    }

    /// Hard-delete condicional. A pré-condição (não publicado E sem matrículas)
    /// é reavaliada dentro da própria instrução de DELETE, então uma matrícula
    /// criada entre a checagem do serviço e a exclusão ainda bloqueia.
    /// Retorna o número de linhas excluídas (0 = nada feito).
    pub async fn delete_course_if_unreferenced<'e, E>(
        &self,
        executor: E,
        course_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM courses c
            WHERE c.id = $1
              AND c.is_published = false
              AND NOT EXISTS (
                  SELECT 1 FROM enrollments e WHERE e.course_id = c.id
              )
            "#,
        )
        .bind(course_id)
        .execute(executor)
        .await
        .map_err(|e| {
            // Curso referenciado por pedido antigo ou por pacote: a FK segura
            // a exclusão e devolvemos a regra de negócio, não um erro interno.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::DeleteBlocked {
                        reason: "has_references",
                    };
                }
            }
            e.into()
        })?;
        Ok(result.rows_affected())
    }

    // ---
    // Matrículas e certificados
    // ---

    /// Matricula o aluno. Idempotente: comprar o mesmo curso duas vezes
    /// (ex.: avulso + dentro de um pacote) não duplica a matrícula.
    pub async fn create_enrollment<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        course_id: Uuid,
        order_id: Option<Uuid>,
    ) -> Result<Option<Enrollment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"
            INSERT INTO enrollments (user_id, course_id, order_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, course_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .bind(order_id)
        .fetch_optional(executor)
        .await?;
        Ok(enrollment)
    }

    pub async fn get_enrollment<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Enrollment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            "SELECT * FROM enrollments WHERE user_id = $1 AND course_id = $2",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(executor)
        .await?;
        Ok(enrollment)
    }

    /// Emite o certificado da matrícula. Reemissão devolve o já existente.
    pub async fn create_certificate<'e, E>(
        &self,
        executor: E,
        enrollment_id: Uuid,
    ) -> Result<Certificate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let certificate = sqlx::query_as::<_, Certificate>(
            r#"
            INSERT INTO certificates (enrollment_id)
            VALUES ($1)
            ON CONFLICT (enrollment_id)
            DO UPDATE SET enrollment_id = EXCLUDED.enrollment_id
            RETURNING *
            "#,
        )
        .bind(enrollment_id)
        .fetch_one(executor)
        .await?;
        Ok(certificate)
    }
}
