//! Freshness and expiry rules for perishable batches
//!
//! The single source of truth for shelf life, remaining days, freshness
//! status, and the sale gate. Every consumer derives freshness through
//! these functions; no call site recomputes it with its own logic.

use chrono::{Days, NaiveDate};
use thiserror::Error;

use crate::catalog;
use crate::models::{FreshnessStatus, QualityGrade, RetailStatus, StorageRecord, StorageType};

/// Remaining days at or below which stock is flagged Consume Soon.
/// Tunable; it directly drives the waste-prevention metric.
pub const DEFAULT_CONSUME_SOON_THRESHOLD_DAYS: i64 = 2;

/// Caller contract violations for freshness computations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FreshnessError {
    #[error("unknown product: {0}")]
    UnknownProduct(String),
}

/// Baseline shelf life in days for a grade/storage combination
///
/// Grades and storage types are closed enumerations, so the table is
/// exhaustive by construction.
pub fn baseline_shelf_life_days(grade: QualityGrade, storage: StorageType) -> i64 {
    match (grade, storage) {
        (QualityGrade::A, StorageType::Normal) => 7,
        (QualityGrade::A, StorageType::Cold) => 14,
        (QualityGrade::B, StorageType::Normal) => 5,
        (QualityGrade::B, StorageType::Cold) => 10,
        (QualityGrade::C, StorageType::Normal) => 3,
        (QualityGrade::C, StorageType::Cold) => 6,
    }
}

/// Shelf life in days after applying the product's spoilage modifier.
/// Never less than one day.
pub fn expected_shelf_life_days(
    grade: QualityGrade,
    storage: StorageType,
    product_id: &str,
) -> Result<i64, FreshnessError> {
    let product = catalog::find_product(product_id)
        .ok_or_else(|| FreshnessError::UnknownProduct(product_id.to_string()))?;
    let baseline = baseline_shelf_life_days(grade, storage) as f64;
    Ok(((baseline * product.shelf_life_modifier).round() as i64).max(1))
}

/// Expiry date for a batch given its harvest date, grade, storage method,
/// and product
pub fn calculate_expiry_date(
    harvest_date: NaiveDate,
    grade: QualityGrade,
    storage: StorageType,
    product_id: &str,
) -> Result<NaiveDate, FreshnessError> {
    let days = expected_shelf_life_days(grade, storage, product_id)?;
    Ok(harvest_date + Days::new(days as u64))
}

/// Whole days until expiry; negative once expired. Callers must not
/// clamp before checking for expiry.
pub fn calculate_remaining_days(expiry_date: NaiveDate, today: NaiveDate) -> i64 {
    (expiry_date - today).num_days()
}

/// Freshness status with the default Consume Soon threshold
pub fn determine_freshness_status(remaining_days: i64) -> FreshnessStatus {
    determine_freshness_status_with_threshold(remaining_days, DEFAULT_CONSUME_SOON_THRESHOLD_DAYS)
}

/// Freshness status with an explicit Consume Soon threshold
pub fn determine_freshness_status_with_threshold(
    remaining_days: i64,
    consume_soon_threshold_days: i64,
) -> FreshnessStatus {
    if remaining_days <= 0 {
        FreshnessStatus::Expired
    } else if remaining_days <= consume_soon_threshold_days {
        FreshnessStatus::ConsumeSoon
    } else {
        FreshnessStatus::Fresh
    }
}

/// The single authoritative sale gate, consulted by both the fulfillment
/// allocator and the retail point of sale
pub fn is_sale_allowed(status: FreshnessStatus) -> bool {
    status != FreshnessStatus::Expired
}

/// Derived retail view of a batch's storage record, with the default
/// Consume Soon threshold
pub fn derive_retail_status(storage: &StorageRecord, today: NaiveDate) -> RetailStatus {
    derive_retail_status_with_threshold(storage, today, DEFAULT_CONSUME_SOON_THRESHOLD_DAYS)
}

/// Derived retail view of a batch's storage record
pub fn derive_retail_status_with_threshold(
    storage: &StorageRecord,
    today: NaiveDate,
    consume_soon_threshold_days: i64,
) -> RetailStatus {
    let remaining_days = calculate_remaining_days(storage.expiry_date, today);
    let status = determine_freshness_status_with_threshold(remaining_days, consume_soon_threshold_days);
    RetailStatus {
        batch_id: storage.batch_id,
        expiry_date: storage.expiry_date,
        remaining_days,
        status,
        sale_allowed: is_sale_allowed(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn cold_storage_doubles_baseline() {
        for grade in QualityGrade::all() {
            assert_eq!(
                baseline_shelf_life_days(grade, StorageType::Cold),
                baseline_shelf_life_days(grade, StorageType::Normal) * 2
            );
        }
    }

    #[test]
    fn tomato_grade_b_normal_is_five_days() {
        let expiry =
            calculate_expiry_date(date(2024, 3, 1), QualityGrade::B, StorageType::Normal, "tomato")
                .unwrap();
        assert_eq!(expiry, date(2024, 3, 6));
    }

    #[test]
    fn spinach_spoils_faster_than_baseline() {
        // 0.4 modifier on the 7-day grade A baseline
        let days =
            expected_shelf_life_days(QualityGrade::A, StorageType::Normal, "spinach").unwrap();
        assert_eq!(days, 3);
    }

    #[test]
    fn unknown_product_fails_fast() {
        let err = calculate_expiry_date(
            date(2024, 3, 1),
            QualityGrade::A,
            StorageType::Normal,
            "durian",
        )
        .unwrap_err();
        assert_eq!(err, FreshnessError::UnknownProduct("durian".to_string()));
    }

    #[test]
    fn shelf_life_never_rounds_to_zero() {
        // grade C normal baseline 3 x spinach 0.4 = 1.2 -> 1
        let days =
            expected_shelf_life_days(QualityGrade::C, StorageType::Normal, "spinach").unwrap();
        assert_eq!(days, 1);
    }

    #[test]
    fn remaining_days_go_negative_after_expiry() {
        assert_eq!(calculate_remaining_days(date(2024, 3, 6), date(2024, 3, 8)), -2);
    }
}
