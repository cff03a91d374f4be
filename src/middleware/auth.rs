// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, models::users::UserRole};

// Claims do JWT emitido pelo provedor de autenticação externo.
// Este serviço só valida; nunca emite token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
}

// O ator da requisição, resolvido do token + cadastro.
// É o que os serviços recebem para checar papel e posse.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn is_super_admin(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }

    pub fn can_manage_course(&self, instructor_id: Uuid) -> bool {
        self.is_super_admin() || self.id == instructor_id
    }
}

// O middleware em si: valida o Bearer token e injeta o Actor na requisição.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let validation = Validation::default();
    let token_data = decode::<Claims>(
        bearer.token(),
        &DecodingKey::from_secret(app_state.jwt_secret.as_ref()),
        &validation,
    )
    .map_err(|_| AppError::InvalidToken)?;

    // O papel vem do cadastro, não do token: rebaixamento vale na hora.
    let user = app_state
        .user_repo
        .find_by_id(token_data.claims.sub)
        .await?
        .ok_or(AppError::InvalidToken)?;

    request.extensions_mut().insert(Actor {
        id: user.id,
        role: user.role,
    });
    Ok(next.run(request).await)
}

// Extrator para obter o ator autenticado diretamente nos handlers
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .copied()
            .ok_or(AppError::InvalidToken)
    }
}
