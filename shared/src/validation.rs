//! Input contract checks shared by intake, ordering, and point of sale

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::catalog;

/// Validate an intake or sale quantity
pub fn validate_quantity_kg(kg: Decimal) -> Result<(), &'static str> {
    if kg <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a harvest date against the current date
pub fn validate_harvest_date(harvest: NaiveDate, today: NaiveDate) -> Result<(), &'static str> {
    if harvest > today {
        return Err("Harvest date cannot be in the future");
    }
    Ok(())
}

/// Validate that a product id exists in the catalog
pub fn validate_product_id(product_id: &str) -> Result<(), &'static str> {
    if catalog::find_product(product_id).is_none() {
        return Err("Unknown product");
    }
    Ok(())
}

/// Validate a requested crate count
pub fn validate_requested_crates(crates: u32) -> Result<(), &'static str> {
    if crates == 0 {
        return Err("Requested crate count must be positive");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_must_be_positive() {
        assert!(validate_quantity_kg(Decimal::from(10)).is_ok());
        assert!(validate_quantity_kg(Decimal::ZERO).is_err());
        assert!(validate_quantity_kg(Decimal::from(-1)).is_err());
    }

    #[test]
    fn harvest_date_not_in_future() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert!(validate_harvest_date(today, today).is_ok());
        let tomorrow = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        assert!(validate_harvest_date(tomorrow, today).is_err());
    }

    #[test]
    fn product_must_be_in_catalog() {
        assert!(validate_product_id("tomato").is_ok());
        assert!(validate_product_id("durian").is_err());
    }

    #[test]
    fn crate_count_must_be_positive() {
        assert!(validate_requested_crates(1).is_ok());
        assert!(validate_requested_crates(0).is_err());
    }
}
