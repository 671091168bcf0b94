//! Three-tier pricing derived from a modal market price
//!
//! One modal price and a grade deterministically produce the farmer
//! payout, warehouse price, and retailer price, in whole currency units.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::QualityGrade;

/// Tunable pricing constants
#[derive(Debug, Clone)]
pub struct PricingPolicy {
    /// Fraction of the modal price paid out to the farmer
    pub farmer_share: Decimal,
    /// Flat per-unit quality testing cost folded into the warehouse price
    pub testing_cost_per_unit: Decimal,
    /// Logistics markup applied on top of modal + testing cost
    pub logistics_markup: Decimal,
    /// Retailer margin applied on the warehouse price
    pub retail_margin: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            farmer_share: Decimal::new(95, 2),
            testing_cost_per_unit: Decimal::from(2),
            logistics_markup: Decimal::new(110, 2),
            retail_margin: Decimal::new(120, 2),
        }
    }
}

/// Per-grade multiplier on the warehouse price
pub fn grade_multiplier(grade: QualityGrade) -> Decimal {
    match grade {
        QualityGrade::A => Decimal::new(115, 2),
        QualityGrade::B => Decimal::new(105, 2),
        QualityGrade::C => Decimal::new(95, 2),
    }
}

/// Farmer / warehouse / retailer unit prices in whole currency units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPricing {
    pub farmer_payout: i64,
    pub warehouse_price: i64,
    pub retailer_price: i64,
}

/// Derive the three price tiers with the default policy
///
/// Pure function of (modal price, grade). For any modal price >= 1 the
/// tiers satisfy farmer_payout < modal <= warehouse_price <= retailer_price.
pub fn compute_three_tier_pricing(modal_price: Decimal, grade: QualityGrade) -> TierPricing {
    compute_three_tier_pricing_with(modal_price, grade, &PricingPolicy::default())
}

/// Derive the three price tiers with an explicit policy
///
/// Farmer payout rounds down; warehouse and retailer prices round up.
pub fn compute_three_tier_pricing_with(
    modal_price: Decimal,
    grade: QualityGrade,
    policy: &PricingPolicy,
) -> TierPricing {
    let farmer = (modal_price * policy.farmer_share).floor();
    let warehouse = ((modal_price + policy.testing_cost_per_unit)
        * policy.logistics_markup
        * grade_multiplier(grade))
    .ceil();
    let retailer = (warehouse * policy.retail_margin).ceil();

    TierPricing {
        farmer_payout: farmer.to_i64().unwrap_or(i64::MAX),
        warehouse_price: warehouse.to_i64().unwrap_or(i64::MAX),
        retailer_price: retailer.to_i64().unwrap_or(i64::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_a_beats_grade_c() {
        let modal = Decimal::from(40);
        let a = compute_three_tier_pricing(modal, QualityGrade::A);
        let c = compute_three_tier_pricing(modal, QualityGrade::C);
        assert!(a.warehouse_price > c.warehouse_price);
        assert!(a.retailer_price > c.retailer_price);
        // farmer payout does not depend on grade
        assert_eq!(a.farmer_payout, c.farmer_payout);
    }

    #[test]
    fn known_values_grade_b() {
        // modal 40: farmer floor(38.0) = 38,
        // warehouse ceil((40 + 2) * 1.10 * 1.05) = ceil(48.51) = 49,
        // retailer ceil(49 * 1.20) = ceil(58.8) = 59
        let t = compute_three_tier_pricing(Decimal::from(40), QualityGrade::B);
        assert_eq!(t.farmer_payout, 38);
        assert_eq!(t.warehouse_price, 49);
        assert_eq!(t.retailer_price, 59);
    }
}
