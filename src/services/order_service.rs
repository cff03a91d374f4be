// src/services/order_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BundleRepository, CourseRepository, OrderRepository},
    middleware::auth::Actor,
    models::commerce::{Order, OrderItem, Payment, PaymentStatus},
    services::pricing::field_error,
};

// Referência de compra: ou um curso avulso, ou um pacote.
#[derive(Debug, Clone, Copy)]
pub struct PurchaseRef {
    pub course_id: Option<Uuid>,
    pub bundle_id: Option<Uuid>,
}

#[derive(Debug)]
pub struct Checkout {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payment: Payment,
}

#[derive(Clone)]
pub struct OrderService {
    repo: OrderRepository,
    course_repo: CourseRepository,
    bundle_repo: BundleRepository,
}

impl OrderService {
    pub fn new(
        repo: OrderRepository,
        course_repo: CourseRepository,
        bundle_repo: BundleRepository,
    ) -> Self {
        Self {
            repo,
            course_repo,
            bundle_repo,
        }
    }

    /// Cria pedido + itens + pagamento pendente numa transação só, com o
    /// total calculado pelos preços vigentes no momento da compra.
    pub async fn checkout<'e, E>(
        &self,
        executor: E,
        actor: &Actor,
        items: &[PurchaseRef],
    ) -> Result<Checkout, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if items.is_empty() {
            return Err(field_error(
                "items",
                "empty_order",
                "O pedido precisa de pelo menos um item.",
            ));
        }

        let mut tx = executor.begin().await?;

        let order = self.repo.create_order(&mut *tx, actor.id).await?;

        let mut total_cents: i64 = 0;
        let mut created_items = Vec::with_capacity(items.len());

        for item in items {
            match (item.course_id, item.bundle_id) {
                (Some(course_id), None) => {
                    let course = self
                        .course_repo
                        .get_course(&mut *tx, course_id)
                        .await?
                        .ok_or(AppError::CourseNotFound)?;
                    if !course.is_published {
                        return Err(field_error(
                            "items",
                            "not_purchasable",
                            "Curso fora do ar não pode ser comprado.",
                        ));
                    }
                    total_cents += course.price_cents;
                    created_items.push(
                        self.repo
                            .add_item(&mut *tx, order.id, Some(course_id), None)
                            .await?,
                    );
                }
                (None, Some(bundle_id)) => {
                    let bundle = self
                        .bundle_repo
                        .get_bundle(&mut *tx, bundle_id)
                        .await?
                        .ok_or(AppError::BundleNotFound)?;
                    if !bundle.is_active {
                        return Err(field_error(
                            "items",
                            "not_purchasable",
                            "Pacote inativo não pode ser comprado.",
                        ));
                    }
                    total_cents += bundle.price_cents;
                    created_items.push(
                        self.repo
                            .add_item(&mut *tx, order.id, None, Some(bundle_id))
                            .await?,
                    );
                }
                _ => {
                    return Err(field_error(
                        "items",
                        "exactly_one_ref",
                        "Cada item referencia ou um curso ou um pacote.",
                    ));
                }
            }
        }

        let payment = self.repo.create_payment(&mut *tx, order.id, total_cents).await?;

        tx.commit().await?;

        Ok(Checkout {
            order,
            items: created_items,
            payment,
        })
    }

    /// Confirmação do provedor de pagamento: pending -> succeeded e, na
    /// mesma transação, matricula o comprador em cada curso avulso e em cada
    /// curso membro dos pacotes comprados. A troca de status é condicional,
    /// então confirmar duas vezes não matricula nem reconhece em dobro.
    pub async fn confirm_payment<'e, E>(
        &self,
        executor: E,
        payment_id: Uuid,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let payment = match self
            .repo
            .transition_payment(
                &mut *tx,
                payment_id,
                PaymentStatus::Pending,
                PaymentStatus::Succeeded,
            )
            .await?
        {
            Some(payment) => payment,
            None => return Err(self.diagnose_flip_failure(&mut tx, payment_id).await),
        };

        let order = self
            .repo
            .get_order(&mut *tx, payment.order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        for item in self.repo.list_items(&mut *tx, payment.order_id).await? {
            if let Some(course_id) = item.course_id {
                self.course_repo
                    .create_enrollment(&mut *tx, order.user_id, course_id, Some(order.id))
                    .await?;
            } else if let Some(bundle_id) = item.bundle_id {
                for course_id in self
                    .bundle_repo
                    .get_member_course_ids(&mut *tx, bundle_id)
                    .await?
                {
                    self.course_repo
                        .create_enrollment(&mut *tx, order.user_id, course_id, Some(order.id))
                        .await?;
                }
            }
        }

        tx.commit().await?;

        tracing::info!(payment_id = %payment_id, order_id = %payment.order_id, "Pagamento confirmado");
        Ok(payment)
    }

    /// Estorno: succeeded -> refunded. As matrículas já concedidas são
    /// preservadas; só a receita reconhecida é revertida nos relatórios.
    pub async fn refund_payment<'e, E>(
        &self,
        executor: E,
        payment_id: Uuid,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let payment = match self
            .repo
            .transition_payment(
                &mut *tx,
                payment_id,
                PaymentStatus::Succeeded,
                PaymentStatus::Refunded,
            )
            .await?
        {
            Some(payment) => payment,
            None => return Err(self.diagnose_flip_failure(&mut tx, payment_id).await),
        };

        tx.commit().await?;
        Ok(payment)
    }

    /// Falha reportada pelo provedor: pending -> failed.
    pub async fn fail_payment<'e, E>(
        &self,
        executor: E,
        payment_id: Uuid,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let payment = match self
            .repo
            .transition_payment(
                &mut *tx,
                payment_id,
                PaymentStatus::Pending,
                PaymentStatus::Failed,
            )
            .await?
        {
            Some(payment) => payment,
            None => return Err(self.diagnose_flip_failure(&mut tx, payment_id).await),
        };

        tx.commit().await?;
        Ok(payment)
    }

    // A troca condicional não pegou ninguém: descobre se o pagamento não
    // existe ou se já saiu do status esperado.
    async fn diagnose_flip_failure(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        payment_id: Uuid,
    ) -> AppError {
        match self.repo.get_payment(&mut **tx, payment_id).await {
            Ok(Some(_)) => AppError::PaymentAlreadyProcessed,
            Ok(None) => AppError::PaymentNotFound,
            Err(err) => err,
        }
    }
}
