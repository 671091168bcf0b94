//! Mass / crate conversion rules
//!
//! Converts between continuous mass (kg) and discrete handling units
//! (crates). The kg -> crates direction rounds up so an allocation never
//! promises more mass than the crate count can physically hold.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::catalog;

/// Crate capacity assumed for products missing from the catalog
pub const DEFAULT_CRATE_CAPACITY_KG: u32 = 12;

/// Kilograms one crate holds for the given product. Never errors;
/// unknown products get the fixed default.
pub fn crate_capacity_kg(product_id: &str) -> Decimal {
    let kg = catalog::find_product(product_id)
        .map(|p| p.crate_capacity_default_kg)
        .unwrap_or(DEFAULT_CRATE_CAPACITY_KG);
    Decimal::from(kg)
}

/// Crates needed to hold the given mass (ceiling division)
pub fn kg_to_crates(kg: Decimal, product_id: &str) -> u32 {
    if kg <= Decimal::ZERO {
        return 0;
    }
    (kg / crate_capacity_kg(product_id))
        .ceil()
        .to_u32()
        .unwrap_or(u32::MAX)
}

/// Total mass the given crate count holds
///
/// Reporting inverse of `kg_to_crates`: round-tripping a crate count is
/// exact, round-tripping a kg figure is lossy by design.
pub fn crates_to_kg(crates: u32, product_id: &str) -> Decimal {
    Decimal::from(crates) * crate_capacity_kg(product_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn unknown_product_uses_default_capacity() {
        assert_eq!(crate_capacity_kg("durian"), Decimal::from(DEFAULT_CRATE_CAPACITY_KG));
    }

    #[test]
    fn partial_crate_rounds_up() {
        // 25 kg of tomato at 12 kg/crate
        assert_eq!(kg_to_crates(dec("25"), "tomato"), 3);
        assert_eq!(kg_to_crates(dec("24"), "tomato"), 2);
        assert_eq!(kg_to_crates(dec("0.1"), "tomato"), 1);
    }

    #[test]
    fn zero_and_negative_mass_need_no_crates() {
        assert_eq!(kg_to_crates(Decimal::ZERO, "tomato"), 0);
        assert_eq!(kg_to_crates(dec("-3"), "tomato"), 0);
    }

    #[test]
    fn crates_to_kg_multiplies_capacity() {
        assert_eq!(crates_to_kg(3, "tomato"), dec("36"));
        assert_eq!(crates_to_kg(0, "tomato"), Decimal::ZERO);
    }
}
