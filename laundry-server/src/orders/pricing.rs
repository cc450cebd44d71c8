//! Line item pricing
//!
//! ```text
//! unit = base_price
//! weight given && price_per_kg  → unit = base_price + round(weight × price_per_kg)
//! price_per_item                → unit = price_per_item   (override, not additive)
//! total = unit × quantity
//! ```
//!
//! All amounts are kobo (`i64`); the weight product is rounded half away from zero.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use shared::models::Service;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("weight must be greater than zero")]
    InvalidWeight,

    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("price overflow for service {0}")]
    Overflow(String),
}

/// Computed price of one order line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePrice {
    pub unit_price: i64,
    pub total_price: i64,
}

/// Price one booked service line
pub fn price_line(
    service: &Service,
    quantity: u32,
    weight_kg: Option<Decimal>,
) -> Result<LinePrice, PricingError> {
    if quantity == 0 {
        return Err(PricingError::InvalidQuantity);
    }
    if weight_kg.is_some_and(|w| w <= Decimal::ZERO) {
        return Err(PricingError::InvalidWeight);
    }
    let overflow = || PricingError::Overflow(service.id.clone());

    let mut unit = service.base_price;

    if let (Some(weight), Some(per_kg)) = (weight_kg, service.price_per_kg) {
        let weighted = weight
            .checked_mul(Decimal::from(per_kg))
            .ok_or_else(overflow)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(overflow)?;
        unit = unit.checked_add(weighted).ok_or_else(overflow)?;
    }

    if let Some(per_item) = service.price_per_item {
        unit = per_item;
    }

    let total = unit
        .checked_mul(i64::from(quantity))
        .ok_or_else(overflow)?;

    Ok(LinePrice {
        unit_price: unit,
        total_price: total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::ServiceType;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn service(base: i64, per_kg: Option<i64>, per_item: Option<i64>) -> Service {
        Service {
            id: "svc-1".into(),
            name: "Wash & Fold".into(),
            service_type: ServiceType::WashAndFold,
            description: None,
            base_price: base,
            price_per_kg: per_kg,
            price_per_item: per_item,
            is_active: true,
            coverage_areas: vec![],
            estimated_hours: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_base_price_only() {
        let price = price_line(&service(150_000, None, None), 2, None).unwrap();
        assert_eq!(price.unit_price, 150_000);
        assert_eq!(price.total_price, 300_000);
    }

    #[test]
    fn test_base_price_times_quantity_for_many_quantities() {
        for base in [0, 1, 99_999, 150_000, 2_500_000] {
            for qty in 1..=25u32 {
                let price = price_line(&service(base, None, None), qty, None).unwrap();
                assert_eq!(price.total_price, base * i64::from(qty));
            }
        }
    }

    #[test]
    fn test_weight_adds_per_kg() {
        // 100000 + 2.5 × 40000 = 200000
        let price = price_line(&service(100_000, Some(40_000), None), 1, Some(dec("2.5"))).unwrap();
        assert_eq!(price.unit_price, 200_000);
    }

    #[test]
    fn test_weight_ignored_without_per_kg_rate() {
        let price = price_line(&service(100_000, None, None), 1, Some(dec("3"))).unwrap();
        assert_eq!(price.unit_price, 100_000);
    }

    #[test]
    fn test_per_kg_without_weight_is_base() {
        let price = price_line(&service(100_000, Some(40_000), None), 3, None).unwrap();
        assert_eq!(price.unit_price, 100_000);
        assert_eq!(price.total_price, 300_000);
    }

    #[test]
    fn test_weight_rounds_half_away_from_zero() {
        // 0.5 × 3 = 1.5 → 2
        let price = price_line(&service(0, Some(3), None), 1, Some(dec("0.5"))).unwrap();
        assert_eq!(price.unit_price, 2);
        // 0.25 × 3 = 0.75 → 1
        let price = price_line(&service(0, Some(3), None), 1, Some(dec("0.25"))).unwrap();
        assert_eq!(price.unit_price, 1);
    }

    #[test]
    fn test_per_item_overrides_per_kg() {
        for weight in ["0.1", "1", "7.75", "40"] {
            let price = price_line(
                &service(100_000, Some(40_000), Some(75_000)),
                2,
                Some(dec(weight)),
            )
            .unwrap();
            assert_eq!(price.unit_price, 75_000);
            assert_eq!(price.total_price, 150_000);
        }
    }

    #[test]
    fn test_invalid_inputs() {
        let svc = service(100_000, Some(40_000), None);
        assert_eq!(price_line(&svc, 0, None), Err(PricingError::InvalidQuantity));
        assert_eq!(
            price_line(&svc, 1, Some(Decimal::ZERO)),
            Err(PricingError::InvalidWeight)
        );
        assert_eq!(
            price_line(&svc, 1, Some(dec("-1"))),
            Err(PricingError::InvalidWeight)
        );
    }

    #[test]
    fn test_overflow_is_an_error() {
        let svc = service(i64::MAX, None, None);
        assert!(matches!(price_line(&svc, 2, None), Err(PricingError::Overflow(_))));
    }
}
