// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::catalog::CourseStatus;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Regra de negócio vira variante estruturada; só falha inesperada vira 500.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Transição ilegal a partir do estado atual. Não adianta repetir a
    // mesma chamada: o chamador precisa de outra ação.
    #[error("Transição '{action}' inválida a partir do estado {from:?}")]
    StateConflict {
        from: CourseStatus,
        action: &'static str,
    },

    // Guarda de negócio, não é bug: acesso pago nunca some silenciosamente.
    #[error("Exclusão bloqueada: {reason}")]
    DeleteBlocked { reason: &'static str },

    #[error("Limite de assentos do plano atingido")]
    SeatLimitReached,

    #[error("Convite expirado")]
    InvitationExpired,

    #[error("Convite já foi aceito")]
    InvitationAlreadyAccepted,

    #[error("Convite não encontrado")]
    InvalidInvitationToken,

    #[error("Usuário já é membro desta empresa")]
    AlreadyCompanyMember,

    #[error("Membro não encontrado nesta empresa")]
    MemberNotFound,

    #[error("Pagamento já processado")]
    PaymentAlreadyProcessed,

    #[error("Curso não encontrado")]
    CourseNotFound,

    #[error("Pacote não encontrado")]
    BundleNotFound,

    #[error("Pedido não encontrado")]
    OrderNotFound,

    #[error("Pagamento não encontrado")]
    PaymentNotFound,

    #[error("Empresa não encontrada")]
    CompanyNotFound,

    #[error("Matrícula não encontrada")]
    EnrollmentNotFound,

    #[error("Ação não permitida para este perfil")]
    Forbidden,

    #[error("Token inválido")]
    InvalidToken,

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    // Pool esgotada ou falha de rede: transitório, o cliente pode repetir
    // com backoff. Tudo o mais em sqlx é tratado como falha interna.
    fn is_store_unavailable(&self) -> bool {
        matches!(
            self,
            AppError::DatabaseError(sqlx::Error::PoolTimedOut)
                | AppError::DatabaseError(sqlx::Error::Io(_))
                | AppError::DatabaseError(sqlx::Error::PoolClosed)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::StateConflict { ref from, action } => {
                let body = Json(json!({
                    "error": format!("A ação '{}' não é válida para o estado atual do curso.", action),
                    "currentStatus": from,
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }

            AppError::DeleteBlocked { reason } => {
                let body = Json(json!({
                    "error": "O curso não pode ser excluído.",
                    "reason": reason,
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }

            AppError::SeatLimitReached => (
                StatusCode::CONFLICT,
                "Todos os assentos do plano já estão em uso.",
            ),
            AppError::InvitationAlreadyAccepted => {
                (StatusCode::CONFLICT, "Este convite já foi aceito.")
            }
            AppError::InvitationExpired => (StatusCode::GONE, "Este convite expirou."),
            AppError::InvalidInvitationToken => {
                (StatusCode::NOT_FOUND, "Convite não encontrado.")
            }
            AppError::AlreadyCompanyMember => {
                (StatusCode::CONFLICT, "Este usuário já ocupa um assento da empresa.")
            }
            AppError::MemberNotFound => {
                (StatusCode::NOT_FOUND, "Membro não encontrado nesta empresa.")
            }
            AppError::PaymentAlreadyProcessed => {
                (StatusCode::CONFLICT, "Este pagamento já foi processado.")
            }
            AppError::CourseNotFound => (StatusCode::NOT_FOUND, "Curso não encontrado."),
            AppError::BundleNotFound => (StatusCode::NOT_FOUND, "Pacote não encontrado."),
            AppError::OrderNotFound => (StatusCode::NOT_FOUND, "Pedido não encontrado."),
            AppError::PaymentNotFound => (StatusCode::NOT_FOUND, "Pagamento não encontrado."),
            AppError::CompanyNotFound => (StatusCode::NOT_FOUND, "Empresa não encontrada."),
            AppError::EnrollmentNotFound => {
                (StatusCode::NOT_FOUND, "Matrícula não encontrada.")
            }
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Seu perfil não tem permissão para esta ação.",
            ),
            AppError::InvalidToken | AppError::JwtError(_) => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.",
            ),

            ref e if e.is_store_unavailable() => {
                tracing::warn!("Banco de dados indisponível: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Serviço temporariamente indisponível. Tente novamente.",
                )
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
