//! Quality grading service
//!
//! Moves batches through the testing pipeline: a test request parks the
//! batch as TestPending, grading assigns the final grade, re-stamps the
//! expiry, and attaches the pricing snapshot.

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use shared::{
    calculate_expiry_date, expected_shelf_life_days, Batch, BatchStatus, QualityGrade,
    StorageRecord,
};

use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::services::pricing::PriceOracle;
use crate::store::{self, keys, KeyValueStore};

/// Grading service for managing batch quality grades
#[derive(Clone)]
pub struct GradingService {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    oracle: Arc<PriceOracle>,
}

/// Input for recording a grading
#[derive(Debug, Deserialize)]
pub struct RecordGradingInput {
    pub grade: QualityGrade,
    /// Destination warehouse whose market prices the batch; without it
    /// the batch is graded unpriced and sells at the base price
    #[serde(default)]
    pub warehouse_id: Option<Uuid>,
}

impl GradingService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        oracle: Arc<PriceOracle>,
    ) -> Self {
        Self { store, clock, oracle }
    }

    /// Queue a registered batch for quality testing
    pub async fn request_quality_test(&self, batch_id: Uuid) -> AppResult<Batch> {
        let mut batch = self.get_batch(batch_id).await?;

        if batch.status != BatchStatus::Registered {
            return Err(AppError::InvalidStateTransition(format!(
                "Batch must be registered to request a test, current status: {}",
                batch.status.as_str()
            )));
        }

        batch.status = BatchStatus::TestPending;
        batch.updated_at = self.clock.now();
        store::put_json(self.store.as_ref(), &keys::batch(batch.id), &batch).await?;

        tracing::info!(batch_id = %batch.id, "quality test requested");
        Ok(batch)
    }

    /// Record the lab grade: re-stamps the expiry with the final grade
    /// and attaches the pricing snapshot
    pub async fn record_grading(
        &self,
        batch_id: Uuid,
        input: RecordGradingInput,
    ) -> AppResult<Batch> {
        let mut batch = self.get_batch(batch_id).await?;

        if batch.status != BatchStatus::TestPending {
            return Err(AppError::InvalidStateTransition(format!(
                "Batch must have a pending test to be graded, current status: {}",
                batch.status.as_str()
            )));
        }

        let mut storage: StorageRecord =
            store::get_json(self.store.as_ref(), &keys::storage(batch.id))
                .await?
                .ok_or_else(|| AppError::NotFound("Storage record".to_string()))?;

        // the provisional expiry is overwritten with the final grade's
        let expiry_date = calculate_expiry_date(
            batch.harvest_date,
            input.grade,
            storage.storage_type,
            &batch.product_id,
        )
        .map_err(|e| AppError::Validation {
            field: "product_id".to_string(),
            message: e.to_string(),
        })?;
        storage.expiry_date = expiry_date;
        storage.expected_shelf_life_days =
            expected_shelf_life_days(input.grade, storage.storage_type, &batch.product_id)
                .map_err(|e| AppError::Validation {
                    field: "product_id".to_string(),
                    message: e.to_string(),
                })?;

        let pricing = self
            .oracle
            .pricing_snapshot(&batch.product_id, input.warehouse_id, input.grade)
            .await?;
        if pricing.is_none() {
            tracing::warn!(
                batch_id = %batch.id,
                product_id = %batch.product_id,
                "no market price available, batch will sell at the base price"
            );
        }

        batch.grade = Some(input.grade);
        batch.status = BatchStatus::Tested;
        batch.pricing = pricing;
        batch.updated_at = self.clock.now();

        store::put_json(self.store.as_ref(), &keys::storage(batch.id), &storage).await?;
        store::put_json(self.store.as_ref(), &keys::batch(batch.id), &batch).await?;

        tracing::info!(
            batch_id = %batch.id,
            grade = %input.grade,
            expiry = %storage.expiry_date,
            priced = batch.pricing.is_some(),
            "batch graded"
        );

        Ok(batch)
    }

    async fn get_batch(&self, batch_id: Uuid) -> AppResult<Batch> {
        store::get_json(self.store.as_ref(), &keys::batch(batch_id))
            .await?
            .ok_or_else(|| AppError::NotFound("Batch".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::clock::FixedClock;
    use crate::external::MarketFeed;
    use crate::services::intake::{IntakeService, RegisterBatchInput};
    use crate::store::MemoryStore;

    struct EmptyFeed;

    #[async_trait]
    impl MarketFeed for EmptyFeed {
        async fn fetch_price_table(&self) -> AppResult<String> {
            Err(AppError::SourceUnavailable("offline".to_string()))
        }
    }

    fn fixtures() -> (IntakeService, GradingService) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()));
        let oracle = Arc::new(PriceOracle::new(
            Arc::new(EmptyFeed),
            store.clone(),
            clock.clone(),
            Duration::from_secs(3600),
        ));
        (
            IntakeService::new(store.clone(), clock.clone()),
            GradingService::new(store, clock, oracle),
        )
    }

    async fn registered_tomato_batch(intake: &IntakeService) -> Batch {
        intake
            .register_batch(RegisterBatchInput {
                product_id: "tomato".to_string(),
                farmer_id: Uuid::new_v4(),
                harvest_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                quantity_kg: Decimal::from(100),
                storage_type: None,
            })
            .await
            .unwrap()
            .batch
    }

    #[tokio::test]
    async fn grade_upgrade_extends_the_expiry() {
        let (intake, grading) = fixtures();
        let batch = registered_tomato_batch(&intake).await;

        let provisional = intake.get_storage(batch.id).await.unwrap();
        assert_eq!(
            provisional.expiry_date,
            NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()
        );

        grading.request_quality_test(batch.id).await.unwrap();
        let graded = grading
            .record_grading(
                batch.id,
                RecordGradingInput { grade: QualityGrade::A, warehouse_id: None },
            )
            .await
            .unwrap();

        let restamped = intake.get_storage(batch.id).await.unwrap();
        assert_eq!(graded.status, BatchStatus::Tested);
        assert_eq!(graded.grade, Some(QualityGrade::A));
        // grade A normal baseline is 7 days: harvest + 7, later than the
        // provisional grade B date
        assert_eq!(
            restamped.expiry_date,
            NaiveDate::from_ymd_opt(2024, 3, 8).unwrap()
        );
        assert!(restamped.expiry_date > provisional.expiry_date);
    }

    #[tokio::test]
    async fn grading_without_pending_test_is_rejected() {
        let (intake, grading) = fixtures();
        let batch = registered_tomato_batch(&intake).await;

        let err = grading
            .record_grading(
                batch.id,
                RecordGradingInput { grade: QualityGrade::A, warehouse_id: None },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidStateTransition(_)));
    }

    #[tokio::test]
    async fn grading_proceeds_unpriced_when_the_feed_is_down() {
        let (intake, grading) = fixtures();
        let batch = registered_tomato_batch(&intake).await;

        grading.request_quality_test(batch.id).await.unwrap();
        let graded = grading
            .record_grading(
                batch.id,
                RecordGradingInput {
                    grade: QualityGrade::B,
                    warehouse_id: Some(Uuid::new_v4()),
                },
            )
            .await
            .unwrap();
        assert!(graded.pricing.is_none());
    }
}
