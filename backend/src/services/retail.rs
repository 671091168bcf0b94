//! Retail service: derived freshness reads and the point of sale
//!
//! Freshness is derived, never stored: every read recomputes remaining
//! days and status from the batch's storage record through the shared
//! freshness rules.

use std::sync::Arc;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::{
    derive_retail_status_with_threshold, validate_quantity_kg, FreshnessStatus,
    RetailStatus, RetailerInventoryRecord, StorageRecord,
};

use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::store::{self, keys, KeyValueStore};

/// Retail service for the retailer-side ledger
#[derive(Clone)]
pub struct RetailService {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    consume_soon_threshold_days: i64,
    waste_estimate_ratio: f64,
}

/// Input for recording a point-of-sale transaction
#[derive(Debug, Deserialize)]
pub struct RecordSaleInput {
    pub batch_id: Uuid,
    pub quantity_kg: Decimal,
}

/// A retailer inventory record with its derived freshness view
#[derive(Debug, Serialize)]
pub struct RetailerInventoryView {
    #[serde(flatten)]
    pub record: RetailerInventoryRecord,
    pub available_kg: Decimal,
    pub retail_status: RetailStatus,
}

/// One consume-soon line in the waste report
#[derive(Debug, Serialize)]
pub struct WasteReportLine {
    pub batch_id: Uuid,
    pub available_kg: Decimal,
    pub remaining_days: i64,
    pub estimated_waste_prevented_kg: Decimal,
}

/// Estimate of waste prevented by selling consume-soon stock
#[derive(Debug, Serialize)]
pub struct WasteReport {
    pub retailer_id: Uuid,
    pub lines: Vec<WasteReportLine>,
    pub total_estimated_waste_prevented_kg: Decimal,
}

impl RetailService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        consume_soon_threshold_days: i64,
        waste_estimate_ratio: f64,
    ) -> Self {
        Self {
            store,
            clock,
            consume_soon_threshold_days,
            waste_estimate_ratio,
        }
    }

    /// Derived retail view of a batch, recomputed on every read
    pub async fn batch_retail_status(&self, batch_id: Uuid) -> AppResult<RetailStatus> {
        let storage: StorageRecord =
            store::get_json(self.store.as_ref(), &keys::storage(batch_id))
                .await?
                .ok_or_else(|| AppError::NotFound("Storage record".to_string()))?;
        Ok(derive_retail_status_with_threshold(
            &storage,
            self.clock.today(),
            self.consume_soon_threshold_days,
        ))
    }

    /// Record a point-of-sale transaction against the retailer's stock
    pub async fn record_sale(
        &self,
        retailer_id: Uuid,
        input: RecordSaleInput,
    ) -> AppResult<RetailerInventoryRecord> {
        validate_quantity_kg(input.quantity_kg).map_err(|m| AppError::Validation {
            field: "quantity_kg".to_string(),
            message: m.to_string(),
        })?;

        // the same gate the allocator consults
        let retail = self.batch_retail_status(input.batch_id).await?;
        if !retail.sale_allowed {
            return Err(AppError::Validation {
                field: "batch_id".to_string(),
                message: "Batch has expired and cannot be sold".to_string(),
            });
        }

        let key = keys::retail_inventory(retailer_id, input.batch_id);
        let mut record: RetailerInventoryRecord = store::get_json(self.store.as_ref(), &key)
            .await?
            .ok_or_else(|| AppError::NotFound("Retailer inventory record".to_string()))?;

        let available = record.available_kg();
        if input.quantity_kg > available {
            return Err(AppError::InsufficientStock {
                requested_kg: input.quantity_kg,
                available_kg: available,
            });
        }

        record.quantity_kg_sold += input.quantity_kg;
        record.updated_at = self.clock.now();
        store::put_json(self.store.as_ref(), &key, &record).await?;

        tracing::info!(
            retailer_id = %retailer_id,
            batch_id = %input.batch_id,
            kg = %input.quantity_kg,
            "sale recorded"
        );
        Ok(record)
    }

    /// The retailer's stock with derived freshness per batch
    pub async fn inventory(&self, retailer_id: Uuid) -> AppResult<Vec<RetailerInventoryView>> {
        let records: Vec<RetailerInventoryRecord> = store::scan_json(
            self.store.as_ref(),
            &keys::retail_inventory_prefix(retailer_id),
        )
        .await?;

        let mut views = Vec::with_capacity(records.len());
        for record in records {
            let retail_status = self.batch_retail_status(record.batch_id).await?;
            views.push(RetailerInventoryView {
                available_kg: record.available_kg(),
                record,
                retail_status,
            });
        }
        Ok(views)
    }

    /// Consume-soon stock and the configured waste-prevented estimate
    pub async fn waste_report(&self, retailer_id: Uuid) -> AppResult<WasteReport> {
        let ratio = Decimal::from_f64(self.waste_estimate_ratio).unwrap_or_default();
        let mut lines = Vec::new();
        let mut total = Decimal::ZERO;

        for view in self.inventory(retailer_id).await? {
            if view.retail_status.status != FreshnessStatus::ConsumeSoon
                || view.available_kg <= Decimal::ZERO
            {
                continue;
            }
            let estimated = view.available_kg * ratio;
            total += estimated;
            lines.push(WasteReportLine {
                batch_id: view.record.batch_id,
                available_kg: view.available_kg,
                remaining_days: view.retail_status.remaining_days,
                estimated_waste_prevented_kg: estimated,
            });
        }

        Ok(WasteReport {
            retailer_id,
            lines,
            total_estimated_waste_prevented_kg: total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{NaiveDate, TimeZone, Utc};

    use shared::StorageType;

    use crate::clock::FixedClock;
    use crate::store::MemoryStore;

    fn service(store: Arc<MemoryStore>) -> RetailService {
        let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap()));
        RetailService::new(store, clock, 2, 0.30)
    }

    async fn seed(
        store: &MemoryStore,
        retailer_id: Uuid,
        expiry: NaiveDate,
        owned_kg: u32,
    ) -> Uuid {
        let batch_id = Uuid::new_v4();
        let storage = StorageRecord {
            batch_id,
            storage_type: StorageType::Normal,
            entry_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            expiry_date: expiry,
            expected_shelf_life_days: 5,
        };
        let record = RetailerInventoryRecord {
            retailer_id,
            batch_id,
            crates_owned: 2,
            quantity_kg_owned: Decimal::from(owned_kg),
            quantity_kg_sold: Decimal::ZERO,
            originating_order_id: Uuid::new_v4(),
            applied_order_ids: vec![Uuid::new_v4()],
            updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
        };
        store::put_json(store, &keys::storage(batch_id), &storage).await.unwrap();
        store::put_json(
            store,
            &keys::retail_inventory(retailer_id, batch_id),
            &record,
        )
        .await
        .unwrap();
        batch_id
    }

    #[tokio::test]
    async fn sales_never_exceed_owned_stock() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());
        let retailer_id = Uuid::new_v4();
        let fresh = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let batch_id = seed(&store, retailer_id, fresh, 24).await;

        let record = service
            .record_sale(retailer_id, RecordSaleInput { batch_id, quantity_kg: Decimal::from(20) })
            .await
            .unwrap();
        assert_eq!(record.available_kg(), Decimal::from(4));

        let err = service
            .record_sale(retailer_id, RecordSaleInput { batch_id, quantity_kg: Decimal::from(5) })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock { .. }));
    }

    #[tokio::test]
    async fn expired_stock_cannot_be_sold() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());
        let retailer_id = Uuid::new_v4();
        // clock is 2024-03-02: expired this morning
        let expired = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let batch_id = seed(&store, retailer_id, expired, 24).await;

        let status = service.batch_retail_status(batch_id).await.unwrap();
        assert_eq!(status.status, FreshnessStatus::Expired);
        assert!(!status.sale_allowed);

        let err = service
            .record_sale(retailer_id, RecordSaleInput { batch_id, quantity_kg: Decimal::ONE })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn waste_report_counts_only_consume_soon_stock() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());
        let retailer_id = Uuid::new_v4();

        // remaining 2 days -> consume soon; remaining 8 days -> fresh
        let soon = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let fresh = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let soon_batch = seed(&store, retailer_id, soon, 20).await;
        seed(&store, retailer_id, fresh, 50).await;

        let report = service.waste_report(retailer_id).await.unwrap();
        assert_eq!(report.lines.len(), 1);
        assert_eq!(report.lines[0].batch_id, soon_batch);
        // 30% of 20 kg
        assert_eq!(report.total_estimated_waste_prevented_kg, Decimal::from(6));
    }
}
