//! Tests for freshness and expiry rules
//!
//! Covers the status boundaries, the sale gate, and the intake/grading
//! scenarios for a normally stored tomato batch.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use shared::{
    calculate_expiry_date, calculate_remaining_days, determine_freshness_status,
    determine_freshness_status_with_threshold, is_sale_allowed, FreshnessStatus, QualityGrade,
    StorageType, DEFAULT_CONSUME_SOON_THRESHOLD_DAYS,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// =============================================================================
// Status boundaries
// =============================================================================

mod status_boundaries {
    use super::*;

    #[test]
    fn expired_exactly_at_zero_remaining_days() {
        assert_eq!(determine_freshness_status(0), FreshnessStatus::Expired);
        assert_eq!(determine_freshness_status(-1), FreshnessStatus::Expired);
        assert_ne!(determine_freshness_status(1), FreshnessStatus::Expired);
    }

    #[test]
    fn consume_soon_band_sits_between_expired_and_fresh() {
        assert_eq!(determine_freshness_status(1), FreshnessStatus::ConsumeSoon);
        assert_eq!(
            determine_freshness_status(DEFAULT_CONSUME_SOON_THRESHOLD_DAYS),
            FreshnessStatus::ConsumeSoon
        );
        assert_eq!(
            determine_freshness_status(DEFAULT_CONSUME_SOON_THRESHOLD_DAYS + 1),
            FreshnessStatus::Fresh
        );
    }

    #[test]
    fn threshold_is_tunable() {
        assert_eq!(
            determine_freshness_status_with_threshold(3, 5),
            FreshnessStatus::ConsumeSoon
        );
        assert_eq!(
            determine_freshness_status_with_threshold(3, 2),
            FreshnessStatus::Fresh
        );
    }
}

// =============================================================================
// Scenarios
// =============================================================================

mod tomato_scenarios {
    use super::*;

    /// Intake stamps a provisional grade B expiry: tomato has a 1.0
    /// shelf-life modifier and grade B keeps 5 days under normal storage.
    #[test]
    fn intake_batch_expires_exactly_on_day_five() {
        let harvest = date(2024, 3, 1);
        let expiry =
            calculate_expiry_date(harvest, QualityGrade::B, StorageType::Normal, "tomato")
                .unwrap();
        assert_eq!(expiry, date(2024, 3, 6));

        // sale is allowed on every day before expiry
        for day in 0..5 {
            let today = harvest + Days::new(day);
            let status = determine_freshness_status(calculate_remaining_days(expiry, today));
            assert!(is_sale_allowed(status), "day {} should be sellable", day);
        }

        // and forbidden from day 5 onward, with no exception path
        let day5 = harvest + Days::new(5);
        let status = determine_freshness_status(calculate_remaining_days(expiry, day5));
        assert_eq!(status, FreshnessStatus::Expired);
        assert!(!is_sale_allowed(status));
    }

    /// Re-grading B -> A moves the expiry from harvest+5 to harvest+7;
    /// remaining days can only increase for an upgrade.
    #[test]
    fn grading_upgrade_never_shortens_remaining_days() {
        let harvest = date(2024, 3, 1);
        let provisional =
            calculate_expiry_date(harvest, QualityGrade::B, StorageType::Normal, "tomato")
                .unwrap();
        let upgraded =
            calculate_expiry_date(harvest, QualityGrade::A, StorageType::Normal, "tomato")
                .unwrap();
        assert_eq!(upgraded, date(2024, 3, 8));

        let today = date(2024, 3, 3);
        assert!(
            calculate_remaining_days(upgraded, today)
                > calculate_remaining_days(provisional, today)
        );
    }
}

// =============================================================================
// Property-Based Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Expired exactly when remaining days are at or below zero.
    #[test]
    fn expired_iff_no_remaining_days(remaining in -3650i64..3650) {
        let status = determine_freshness_status(remaining);
        prop_assert_eq!(status == FreshnessStatus::Expired, remaining <= 0);
    }

    /// The sale gate is false exactly when the status is Expired.
    #[test]
    fn sale_gate_follows_expiry(remaining in -3650i64..3650) {
        let status = determine_freshness_status(remaining);
        prop_assert_eq!(is_sale_allowed(status), status != FreshnessStatus::Expired);
        prop_assert_eq!(is_sale_allowed(status), remaining > 0);
    }

    /// A better grade never expires earlier, whatever the storage.
    #[test]
    fn better_grades_keep_longer(
        cold in any::<bool>(),
        harvest_offset in 0u64..3650,
    ) {
        let storage = if cold { StorageType::Cold } else { StorageType::Normal };
        let harvest = date(2020, 1, 1) + Days::new(harvest_offset);
        let a = calculate_expiry_date(harvest, QualityGrade::A, storage, "tomato").unwrap();
        let b = calculate_expiry_date(harvest, QualityGrade::B, storage, "tomato").unwrap();
        let c = calculate_expiry_date(harvest, QualityGrade::C, storage, "tomato").unwrap();
        prop_assert!(a >= b);
        prop_assert!(b >= c);
        prop_assert!(c > harvest);
    }
}
