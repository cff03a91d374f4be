// src/services/pricing.rs
//
// Precificação de pacotes. Funções puras: o serviço de pacotes chama dentro
// da transação que grava composição + preço, então nunca existe estado
// persistido em que os dois discordem.

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};

use crate::common::error::AppError;

// Tudo em centavos inteiros. Decimal entra só como intermediário exato do
// desconto, com arredondamento "metade para cima" aplicado uma única vez.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleQuote {
    pub original_price_cents: i64,
    pub discount_percent: i32,
    pub discount_amount_cents: i64,
    pub final_price_cents: i64,
}

// Monta um AppError::ValidationError de um campo só, no mesmo formato que o
// `validator` derive produz nos payloads.
pub(crate) fn field_error(
    field: &'static str,
    code: &'static str,
    message: &'static str,
) -> AppError {
    let mut err = validator::ValidationError::new(code);
    err.message = Some(message.into());
    let mut errors = validator::ValidationErrors::new();
    errors.add(field, err);
    AppError::ValidationError(errors)
}

/// Faixa de desconto derivada apenas da quantidade de cursos.
pub fn discount_tier(course_count: usize) -> i32 {
    match course_count {
        0 | 1 => 0,
        2 => 10,
        _ => 20,
    }
}

/// Calcula o preço do pacote a partir dos preços atuais dos cursos membros.
///
/// O override, quando presente, vence a faixa derivada; fora de 0–100 a
/// chamada é rejeitada (nunca saturada). Lista vazia e preço negativo também
/// são rejeitados — o preço final é garantidamente >= 0.
pub fn compute_bundle_price(
    course_prices: &[i64],
    override_discount_percent: Option<i32>,
) -> Result<BundleQuote, AppError> {
    if course_prices.is_empty() {
        return Err(field_error(
            "courseIds",
            "empty_bundle",
            "Um pacote precisa de pelo menos um curso.",
        ));
    }
    if course_prices.iter().any(|p| *p < 0) {
        return Err(field_error(
            "courseIds",
            "invalid_price",
            "Curso com preço negativo não pode compor um pacote.",
        ));
    }

    let discount_percent = match override_discount_percent {
        Some(pct) => {
            if !(0..=100).contains(&pct) {
                return Err(field_error(
                    "discountPercent",
                    "range",
                    "O desconto deve estar entre 0 e 100.",
                ));
            }
            pct
        }
        None => discount_tier(course_prices.len()),
    };

    let original_price_cents: i64 = course_prices.iter().sum();

    // round(original * pct / 100), metade para cima, exato em Decimal.
    let discount_amount_cents = (Decimal::from(original_price_cents)
        * Decimal::from(discount_percent)
        / Decimal::from(100))
    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    .to_i64()
    .unwrap_or(0);

    Ok(BundleQuote {
        original_price_cents,
        discount_percent,
        discount_amount_cents,
        final_price_cents: original_price_cents - discount_amount_cents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_depends_only_on_count() {
        assert_eq!(discount_tier(0), 0);
        assert_eq!(discount_tier(1), 0);
        assert_eq!(discount_tier(2), 10);
        assert_eq!(discount_tier(3), 20);
        assert_eq!(discount_tier(12), 20);
    }

    #[test]
    fn three_courses_get_twenty_percent() {
        let quote = compute_bundle_price(&[1000, 2000, 3000], None).unwrap();
        assert_eq!(quote.original_price_cents, 6000);
        assert_eq!(quote.discount_percent, 20);
        assert_eq!(quote.discount_amount_cents, 1200);
        assert_eq!(quote.final_price_cents, 4800);
    }

    #[test]
    fn two_courses_get_ten_percent() {
        let quote = compute_bundle_price(&[1000, 2000], None).unwrap();
        assert_eq!(quote.discount_percent, 10);
        assert_eq!(quote.discount_amount_cents, 300);
        assert_eq!(quote.final_price_cents, 2700);
    }

    #[test]
    fn single_course_gets_no_discount() {
        let quote = compute_bundle_price(&[4990], None).unwrap();
        assert_eq!(quote.discount_percent, 0);
        assert_eq!(quote.discount_amount_cents, 0);
        assert_eq!(quote.final_price_cents, 4990);
    }

    #[test]
    fn rounds_half_up() {
        // 5% de 1050 = 52.5 -> 53
        let quote = compute_bundle_price(&[1050], Some(5)).unwrap();
        assert_eq!(quote.discount_amount_cents, 53);
        assert_eq!(quote.final_price_cents, 997);
    }

    #[test]
    fn zero_priced_courses_are_exact() {
        let quote = compute_bundle_price(&[0, 0, 0], None).unwrap();
        assert_eq!(quote.original_price_cents, 0);
        assert_eq!(quote.discount_percent, 20);
        assert_eq!(quote.discount_amount_cents, 0);
        assert_eq!(quote.final_price_cents, 0);
    }

    #[test]
    fn override_wins_over_tier() {
        let quote = compute_bundle_price(&[1000, 2000, 3000], Some(50)).unwrap();
        assert_eq!(quote.discount_percent, 50);
        assert_eq!(quote.final_price_cents, 3000);

        // Limites da faixa são aceitos, inclusive o desconto total.
        let free = compute_bundle_price(&[1000, 2000], Some(100)).unwrap();
        assert_eq!(free.final_price_cents, 0);
        let none = compute_bundle_price(&[1000, 2000], Some(0)).unwrap();
        assert_eq!(none.final_price_cents, 3000);
    }

    #[test]
    fn override_out_of_range_is_rejected() {
        assert!(compute_bundle_price(&[1000], Some(-1)).is_err());
        assert!(compute_bundle_price(&[1000], Some(101)).is_err());
    }

    #[test]
    fn empty_bundle_is_rejected() {
        assert!(compute_bundle_price(&[], None).is_err());
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(compute_bundle_price(&[1000, -1], None).is_err());
    }

    #[test]
    fn final_price_is_exact_for_every_tier() {
        for prices in [vec![1], vec![99, 1], vec![33, 33, 34], vec![0, 1, 2, 3]] {
            let quote = compute_bundle_price(&prices, None).unwrap();
            assert_eq!(
                quote.final_price_cents,
                quote.original_price_cents - quote.discount_amount_cents
            );
            assert!(quote.final_price_cents >= 0);
        }
    }
}
