// src/handlers/orders.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::Actor,
    models::commerce::{Order, OrderItem, Payment},
    services::order_service::PurchaseRef,
};

// ---
// Payload: CreateOrder
// ---
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemPayload {
    pub course_id: Option<Uuid>,
    pub bundle_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    #[validate(length(min = 1, message = "O pedido precisa de pelo menos um item."))]
    pub items: Vec<OrderItemPayload>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payment: Payment,
}

/// Checkout: pedido + itens + pagamento pendente com os preços vigentes.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderPayload,
    responses((status = 201, body = CheckoutResponse), (status = 400)),
    tag = "Orders",
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let refs: Vec<PurchaseRef> = payload
        .items
        .iter()
        .map(|item| PurchaseRef {
            course_id: item.course_id,
            bundle_id: item.bundle_id,
        })
        .collect();

    let checkout = app_state
        .order_service
        .checkout(&app_state.db_pool, &actor, &refs)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order: checkout.order,
            items: checkout.items,
            payment: checkout.payment,
        }),
    ))
}

// ---
// Callbacks do provedor de pagamento (autenticados como super admin)
// ---

/// Confirma o pagamento e matricula o comprador. Idempotente: a segunda
/// confirmação recebe 409.
#[utoipa::path(
    post,
    path = "/api/payments/{id}/confirm",
    params(("id" = Uuid, Path, description = "Id do pagamento")),
    responses((status = 200, body = Payment), (status = 409)),
    tag = "Orders",
    security(("api_jwt" = []))
)]
pub async fn confirm_payment(
    State(app_state): State<AppState>,
    actor: Actor,
    Path(payment_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !actor.is_super_admin() {
        return Err(AppError::Forbidden);
    }

    let payment = app_state
        .order_service
        .confirm_payment(&app_state.db_pool, payment_id)
        .await?;
    Ok((StatusCode::OK, Json(payment)))
}

/// Estorna um pagamento confirmado. As matrículas permanecem.
#[utoipa::path(
    post,
    path = "/api/payments/{id}/refund",
    params(("id" = Uuid, Path, description = "Id do pagamento")),
    responses((status = 200, body = Payment), (status = 409)),
    tag = "Orders",
    security(("api_jwt" = []))
)]
pub async fn refund_payment(
    State(app_state): State<AppState>,
    actor: Actor,
    Path(payment_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !actor.is_super_admin() {
        return Err(AppError::Forbidden);
    }

    let payment = app_state
        .order_service
        .refund_payment(&app_state.db_pool, payment_id)
        .await?;
    Ok((StatusCode::OK, Json(payment)))
}

#[utoipa::path(
    post,
    path = "/api/payments/{id}/fail",
    params(("id" = Uuid, Path, description = "Id do pagamento")),
    responses((status = 200, body = Payment), (status = 409)),
    tag = "Orders",
    security(("api_jwt" = []))
)]
pub async fn fail_payment(
    State(app_state): State<AppState>,
    actor: Actor,
    Path(payment_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !actor.is_super_admin() {
        return Err(AppError::Forbidden);
    }

    let payment = app_state
        .order_service
        .fail_payment(&app_state.db_pool, payment_id)
        .await?;
    Ok((StatusCode::OK, Json(payment)))
}
