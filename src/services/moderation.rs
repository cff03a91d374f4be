// src/services/moderation.rs
//
// Regras do ciclo editorial do curso. Funções puras: recebem o curso atual e
// devolvem o trio (status, is_published, rejection_reason) que o repositório
// grava num único UPDATE — ou o erro que deixa tudo como estava.

use crate::common::error::AppError;
use crate::models::catalog::{Course, CourseStatus};
use crate::services::pricing::field_error;

pub const MIN_REJECTION_REASON_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    pub status: CourseStatus,
    pub is_published: bool,
    pub rejection_reason: Option<String>,
}

/// draft -> pending. Exige título preenchido e pelo menos uma aula; a falha
/// de validação devolve a lista de erros por campo e não toca no estado.
pub fn submit(course: &Course, lesson_count: i64) -> Result<TransitionOutcome, AppError> {
    if course.status != CourseStatus::Draft {
        return Err(AppError::StateConflict {
            from: course.status,
            action: "submit",
        });
    }

    let mut errors = validator::ValidationErrors::new();
    if course.title.trim().is_empty() {
        let mut err = validator::ValidationError::new("required");
        err.message = Some("O curso precisa de um título para ser enviado.".into());
        errors.add("title", err);
    }
    if lesson_count < 1 {
        let mut err = validator::ValidationError::new("min_lessons");
        err.message = Some("O curso precisa de pelo menos uma aula para ser enviado.".into());
        errors.add("lessons", err);
    }
    if !errors.is_empty() {
        return Err(AppError::ValidationError(errors));
    }

    Ok(TransitionOutcome {
        status: CourseStatus::Pending,
        is_published: false,
        rejection_reason: course.rejection_reason.clone(),
    })
}

/// pending | rejected | archived -> approved. Única transição que liga
/// is_published; o motivo de rejeição é limpo no mesmo passo.
pub fn approve(course: &Course) -> Result<TransitionOutcome, AppError> {
    match course.status {
        CourseStatus::Pending | CourseStatus::Rejected | CourseStatus::Archived => {
            Ok(TransitionOutcome {
                status: CourseStatus::Approved,
                is_published: true,
                rejection_reason: None,
            })
        }
        from => Err(AppError::StateConflict {
            from,
            action: "approve",
        }),
    }
}

/// Qualquer estado não-publicado e não-arquivado -> rejected.
/// O motivo (>= 10 caracteres úteis) é obrigatório.
pub fn reject(course: &Course, reason: &str) -> Result<TransitionOutcome, AppError> {
    let trimmed = reason.trim();
    if trimmed.chars().count() < MIN_REJECTION_REASON_LEN {
        return Err(field_error(
            "rejectionReason",
            "length",
            "O motivo da rejeição precisa de pelo menos 10 caracteres.",
        ));
    }

    if course.is_published || course.status == CourseStatus::Archived {
        return Err(AppError::StateConflict {
            from: course.status,
            action: "reject",
        });
    }

    Ok(TransitionOutcome {
        status: CourseStatus::Rejected,
        is_published: false,
        rejection_reason: Some(trimmed.to_string()),
    })
}

/// Tira o curso do ar sem mexer no status nem nas matrículas existentes:
/// é só visibilidade, nenhum dado de aluno muda.
pub fn unpublish(course: &Course) -> Result<TransitionOutcome, AppError> {
    if !course.is_published {
        return Err(AppError::StateConflict {
            from: course.status,
            action: "unpublish",
        });
    }

    Ok(TransitionOutcome {
        status: course.status,
        is_published: false,
        rejection_reason: course.rejection_reason.clone(),
    })
}

/// Arquivar é permitido de qualquer estado e implica sair do ar.
/// Reversível: uma nova aprovação traz o curso de volta.
pub fn archive(course: &Course) -> Result<TransitionOutcome, AppError> {
    Ok(TransitionOutcome {
        status: CourseStatus::Archived,
        is_published: false,
        rejection_reason: course.rejection_reason.clone(),
    })
}

/// Pré-condição do hard-delete, conferida aqui para mensagens de erro e
/// reconferida dentro do próprio DELETE condicional no banco.
pub fn can_delete(course: &Course, enrollment_count: i64) -> Result<(), AppError> {
    if course.is_published {
        return Err(AppError::DeleteBlocked {
            reason: "is_published",
        });
    }
    if enrollment_count > 0 {
        return Err(AppError::DeleteBlocked {
            reason: "has_enrollments",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn course(status: CourseStatus, is_published: bool) -> Course {
        Course {
            id: Uuid::new_v4(),
            instructor_id: Uuid::new_v4(),
            title: "Curso de Teste".to_string(),
            description: None,
            price_cents: 1000,
            status,
            is_published,
            rejection_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn submit_moves_draft_to_pending() {
        let out = submit(&course(CourseStatus::Draft, false), 3).unwrap();
        assert_eq!(out.status, CourseStatus::Pending);
        assert!(!out.is_published);
    }

    #[test]
    fn submit_requires_title_and_lessons() {
        let mut c = course(CourseStatus::Draft, false);
        c.title = "   ".to_string();
        let err = submit(&c, 0).unwrap_err();
        match err {
            AppError::ValidationError(errors) => {
                let fields = errors.field_errors();
                assert!(fields.contains_key("title"));
                assert!(fields.contains_key("lessons"));
            }
            other => panic!("esperava ValidationError, veio {other:?}"),
        }
    }

    #[test]
    fn submit_from_non_draft_is_a_conflict() {
        for status in [
            CourseStatus::Pending,
            CourseStatus::Approved,
            CourseStatus::Rejected,
            CourseStatus::Archived,
        ] {
            let err = submit(&course(status, false), 3).unwrap_err();
            assert!(matches!(err, AppError::StateConflict { .. }));
        }
    }

    #[test]
    fn approve_publishes_and_clears_reason_from_every_allowed_state() {
        for status in [
            CourseStatus::Pending,
            CourseStatus::Rejected,
            CourseStatus::Archived,
        ] {
            let mut c = course(status, false);
            c.rejection_reason = Some("conteúdo incompleto".to_string());
            let out = approve(&c).unwrap();
            assert_eq!(out.status, CourseStatus::Approved);
            assert!(out.is_published);
            assert_eq!(out.rejection_reason, None);
        }
    }

    #[test]
    fn approve_from_draft_is_a_conflict() {
        let err = approve(&course(CourseStatus::Draft, false)).unwrap_err();
        assert!(matches!(err, AppError::StateConflict { .. }));
    }

    #[test]
    fn reject_requires_a_meaningful_reason() {
        let c = course(CourseStatus::Pending, false);
        // Curto demais, mesmo com espaços ao redor.
        assert!(reject(&c, "  ruim  ").is_err());
        // A falha não produz transição nenhuma (o chamador não grava nada).
        let out = reject(&c, "faltam exercícios práticos").unwrap();
        assert_eq!(out.status, CourseStatus::Rejected);
        assert_eq!(
            out.rejection_reason.as_deref(),
            Some("faltam exercícios práticos")
        );
    }

    #[test]
    fn reject_is_blocked_for_published_or_archived() {
        let published = course(CourseStatus::Approved, true);
        assert!(matches!(
            reject(&published, "motivo suficientemente longo").unwrap_err(),
            AppError::StateConflict { .. }
        ));

        let archived = course(CourseStatus::Archived, false);
        assert!(matches!(
            reject(&archived, "motivo suficientemente longo").unwrap_err(),
            AppError::StateConflict { .. }
        ));
    }

    #[test]
    fn unpublish_only_changes_visibility() {
        let out = unpublish(&course(CourseStatus::Approved, true)).unwrap();
        assert_eq!(out.status, CourseStatus::Approved);
        assert!(!out.is_published);

        assert!(unpublish(&course(CourseStatus::Approved, false)).is_err());
    }

    #[test]
    fn archive_is_allowed_from_any_state() {
        for (status, published) in [
            (CourseStatus::Draft, false),
            (CourseStatus::Pending, false),
            (CourseStatus::Approved, true),
            (CourseStatus::Rejected, false),
            (CourseStatus::Published, true),
            (CourseStatus::Archived, false),
        ] {
            let out = archive(&course(status, published)).unwrap();
            assert_eq!(out.status, CourseStatus::Archived);
            assert!(!out.is_published);
        }
    }

    #[test]
    fn delete_guard_blocks_published_or_enrolled() {
        assert!(can_delete(&course(CourseStatus::Draft, false), 0).is_ok());
        assert!(matches!(
            can_delete(&course(CourseStatus::Approved, true), 0).unwrap_err(),
            AppError::DeleteBlocked { reason: "is_published" }
        ));
        assert!(matches!(
            can_delete(&course(CourseStatus::Draft, false), 1).unwrap_err(),
            AppError::DeleteBlocked { reason: "has_enrollments" }
        ));
    }
}
