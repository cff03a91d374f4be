// src/services/revenue.rs
//
// Atribuição de receita: junta pagamentos a itens compráveis e devolve o
// mapa curso -> centavos reconhecidos. Pura e somente-leitura; roda em
// paralelo sem trava nenhuma.

use std::collections::HashMap;

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::models::analytics::{BundleMemberRecord, OrderItemRecord, PaymentRecord};
use crate::models::commerce::PaymentStatus;

#[derive(Debug, Default, PartialEq)]
pub struct RevenueAttribution {
    // Mapa fechado: curso sem receita atribuída não aparece.
    pub per_course: HashMap<Uuid, i64>,

    // Receita que não pôde ser atribuída (pacote sem nenhum curso membro).
    // Exposta para auditoria em vez de sumir dos totais.
    pub unattributed_cents: i64,

    pub total_recognized_cents: i64,
}

/// Receita reconhecida por pedido: soma dos pagamentos `succeeded` menos os
/// `refunded`. Um pedido com vários pagamentos soma todos antes do rateio.
fn recognized_by_order(payments: &[PaymentRecord]) -> HashMap<Uuid, i64> {
    let mut recognized: HashMap<Uuid, i64> = HashMap::new();
    for payment in payments {
        let signed = match payment.status {
            PaymentStatus::Succeeded => payment.amount_cents,
            PaymentStatus::Refunded => -payment.amount_cents,
            PaymentStatus::Pending | PaymentStatus::Failed => continue,
        };
        *recognized.entry(payment.order_id).or_insert(0) += signed;
    }
    recognized
}

/// Atribui a receita reconhecida aos cursos.
///
/// Item que referencia curso direto recebe o valor reconhecido do pedido
/// inteiro. Item que referencia pacote divide o valor igualmente entre os
/// cursos membros atuais, em rateio racional exato: o acumulador de cada
/// curso fica em Decimal e o arredondamento (metade para cima) acontece uma
/// única vez, sobre o total do curso — nunca rateio a rateio, para não
/// acumular erro sistemático.
pub fn attribute_revenue(
    payments: &[PaymentRecord],
    order_items: &[OrderItemRecord],
    bundle_members: &[BundleMemberRecord],
) -> RevenueAttribution {
    let recognized = recognized_by_order(payments);

    let mut members_by_bundle: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for member in bundle_members {
        members_by_bundle
            .entry(member.bundle_id)
            .or_default()
            .push(member.course_id);
    }

    let mut accumulated: HashMap<Uuid, Decimal> = HashMap::new();
    let mut unattributed_cents: i64 = 0;

    for item in order_items {
        let Some(&amount) = recognized.get(&item.order_id) else {
            continue;
        };
        if amount == 0 {
            continue;
        }

        if let Some(course_id) = item.course_id {
            *accumulated.entry(course_id).or_insert(Decimal::ZERO) += Decimal::from(amount);
        } else if let Some(bundle_id) = item.bundle_id {
            match members_by_bundle.get(&bundle_id) {
                Some(members) if !members.is_empty() => {
                    let share = Decimal::from(amount) / Decimal::from(members.len() as i64);
                    for course_id in members {
                        *accumulated.entry(*course_id).or_insert(Decimal::ZERO) += share;
                    }
                }
                _ => {
                    // Pacote que perdeu todos os membros: anomalia auditável.
                    tracing::warn!(
                        bundle_id = %bundle_id,
                        order_id = %item.order_id,
                        amount_cents = amount,
                        "Receita de pacote sem cursos membros ficou sem atribuição"
                    );
                    unattributed_cents += amount;
                }
            }
        }
    }

    let mut per_course: HashMap<Uuid, i64> = HashMap::new();
    for (course_id, total) in accumulated {
        let cents = total
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .unwrap_or(0);
        if cents != 0 {
            per_course.insert(course_id, cents);
        }
    }

    RevenueAttribution {
        per_course,
        unattributed_cents,
        total_recognized_cents: recognized.values().sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(order_id: Uuid, amount_cents: i64, status: PaymentStatus) -> PaymentRecord {
        PaymentRecord {
            order_id,
            amount_cents,
            status,
            paid_at: None,
        }
    }

    fn course_item(order_id: Uuid, course_id: Uuid) -> OrderItemRecord {
        OrderItemRecord {
            order_id,
            course_id: Some(course_id),
            bundle_id: None,
        }
    }

    fn bundle_item(order_id: Uuid, bundle_id: Uuid) -> OrderItemRecord {
        OrderItemRecord {
            order_id,
            course_id: None,
            bundle_id: Some(bundle_id),
        }
    }

    fn member(bundle_id: Uuid, course_id: Uuid) -> BundleMemberRecord {
        BundleMemberRecord {
            bundle_id,
            course_id,
        }
    }

    #[test]
    fn direct_course_sale_gets_full_amount() {
        let order = Uuid::new_v4();
        let course = Uuid::new_v4();

        let result = attribute_revenue(
            &[payment(order, 4990, PaymentStatus::Succeeded)],
            &[course_item(order, course)],
            &[],
        );

        assert_eq!(result.per_course.get(&course), Some(&4990));
        assert_eq!(result.unattributed_cents, 0);
        assert_eq!(result.total_recognized_cents, 4990);
    }

    #[test]
    fn bundle_sale_splits_evenly_among_three() {
        let order = Uuid::new_v4();
        let bundle = Uuid::new_v4();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        // Venda de 4800 do pacote [1000, 2000, 3000] com 20% de desconto.
        let result = attribute_revenue(
            &[payment(order, 4800, PaymentStatus::Succeeded)],
            &[bundle_item(order, bundle)],
            &[member(bundle, a), member(bundle, b), member(bundle, c)],
        );

        assert_eq!(result.per_course.get(&a), Some(&1600));
        assert_eq!(result.per_course.get(&b), Some(&1600));
        assert_eq!(result.per_course.get(&c), Some(&1600));
    }

    #[test]
    fn split_rounds_once_per_course_total() {
        let bundle = Uuid::new_v4();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        // Duas vendas de 100 rateadas por 3: cada curso acumula 66.66...,
        // que arredonda uma vez para 67 — e não 33 + 33 = 66.
        let o1 = Uuid::new_v4();
        let o2 = Uuid::new_v4();
        let result = attribute_revenue(
            &[
                payment(o1, 100, PaymentStatus::Succeeded),
                payment(o2, 100, PaymentStatus::Succeeded),
            ],
            &[bundle_item(o1, bundle), bundle_item(o2, bundle)],
            &[member(bundle, a), member(bundle, b), member(bundle, c)],
        );

        assert_eq!(result.per_course.get(&a), Some(&67));
        assert_eq!(result.per_course.get(&b), Some(&67));
        assert_eq!(result.per_course.get(&c), Some(&67));
    }

    #[test]
    fn conservation_within_rounding_tolerance() {
        let bundle = Uuid::new_v4();
        let courses: Vec<Uuid> = (0..7).map(|_| Uuid::new_v4()).collect();
        let members: Vec<BundleMemberRecord> =
            courses.iter().map(|c| member(bundle, *c)).collect();

        let orders: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let payments: Vec<PaymentRecord> = orders
            .iter()
            .enumerate()
            .map(|(i, o)| payment(*o, 1003 + i as i64, PaymentStatus::Succeeded))
            .collect();
        let items: Vec<OrderItemRecord> =
            orders.iter().map(|o| bundle_item(*o, bundle)).collect();

        let result = attribute_revenue(&payments, &items, &members);

        let attributed: i64 = result.per_course.values().sum();
        let recognized: i64 = payments.iter().map(|p| p.amount_cents).sum();
        let splits = items.len() as i64;
        assert!(
            (attributed + result.unattributed_cents - recognized).abs() <= splits,
            "atribuído {attributed} vs reconhecido {recognized}"
        );
    }

    #[test]
    fn multiple_payments_of_one_order_are_summed_before_split() {
        let order = Uuid::new_v4();
        let bundle = Uuid::new_v4();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let result = attribute_revenue(
            &[
                payment(order, 1000, PaymentStatus::Succeeded),
                payment(order, 500, PaymentStatus::Succeeded),
                payment(order, 200, PaymentStatus::Failed),
            ],
            &[bundle_item(order, bundle)],
            &[member(bundle, a), member(bundle, b)],
        );

        assert_eq!(result.per_course.get(&a), Some(&750));
        assert_eq!(result.per_course.get(&b), Some(&750));
        assert_eq!(result.total_recognized_cents, 1500);
    }

    #[test]
    fn refund_subtracts_what_was_recognized() {
        let order = Uuid::new_v4();
        let course = Uuid::new_v4();

        let result = attribute_revenue(
            &[
                payment(order, 3000, PaymentStatus::Succeeded),
                payment(order, 3000, PaymentStatus::Refunded),
            ],
            &[course_item(order, course)],
            &[],
        );

        // Reconhecimento líquido zero: o curso sai do mapa (fechado).
        assert!(result.per_course.is_empty());
        assert_eq!(result.total_recognized_cents, 0);
    }

    #[test]
    fn memberless_bundle_goes_to_unattributed() {
        let order = Uuid::new_v4();
        let bundle = Uuid::new_v4();

        let result = attribute_revenue(
            &[payment(order, 2500, PaymentStatus::Succeeded)],
            &[bundle_item(order, bundle)],
            &[],
        );

        assert!(result.per_course.is_empty());
        assert_eq!(result.unattributed_cents, 2500);
        assert_eq!(result.total_recognized_cents, 2500);
    }

    #[test]
    fn course_in_two_bundles_is_credited_by_each() {
        let (o1, o2) = (Uuid::new_v4(), Uuid::new_v4());
        let (b1, b2) = (Uuid::new_v4(), Uuid::new_v4());
        let shared = Uuid::new_v4();
        let other = Uuid::new_v4();

        let result = attribute_revenue(
            &[
                payment(o1, 1000, PaymentStatus::Succeeded),
                payment(o2, 2000, PaymentStatus::Succeeded),
            ],
            &[bundle_item(o1, b1), bundle_item(o2, b2)],
            &[member(b1, shared), member(b2, shared), member(b2, other)],
        );

        // 1000 inteiro do primeiro pacote + 1000 (metade) do segundo.
        assert_eq!(result.per_course.get(&shared), Some(&2000));
        assert_eq!(result.per_course.get(&other), Some(&1000));
    }
}
