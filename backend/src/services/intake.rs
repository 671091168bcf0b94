//! Batch intake service
//!
//! Registers harvested lots and stamps them with a provisional expiry
//! until the quality lab grades them.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::{
    calculate_expiry_date, expected_shelf_life_days, kg_to_crates, validate_harvest_date,
    validate_product_id, validate_quantity_kg, Batch, BatchStatus, QualityGrade, StorageRecord,
    StorageType,
};

use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::store::{self, keys, KeyValueStore};

/// Grade assumed for the provisional expiry until grading
pub const PROVISIONAL_GRADE: QualityGrade = QualityGrade::B;

/// Intake service for registering harvested batches
#[derive(Clone)]
pub struct IntakeService {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

/// Input for registering a batch
#[derive(Debug, Deserialize)]
pub struct RegisterBatchInput {
    pub product_id: String,
    pub farmer_id: Uuid,
    pub harvest_date: NaiveDate,
    pub quantity_kg: Decimal,
    #[serde(default)]
    pub storage_type: Option<StorageType>,
}

/// A registered batch together with its provisional storage record
#[derive(Debug, Serialize)]
pub struct RegisteredBatch {
    pub batch: Batch,
    pub storage: StorageRecord,
}

impl IntakeService {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Register a harvested batch and stamp its provisional expiry
    pub async fn register_batch(&self, input: RegisterBatchInput) -> AppResult<RegisteredBatch> {
        let today = self.clock.today();

        validate_product_id(&input.product_id).map_err(|m| AppError::Validation {
            field: "product_id".to_string(),
            message: m.to_string(),
        })?;
        validate_quantity_kg(input.quantity_kg).map_err(|m| AppError::Validation {
            field: "quantity_kg".to_string(),
            message: m.to_string(),
        })?;
        validate_harvest_date(input.harvest_date, today).map_err(|m| AppError::Validation {
            field: "harvest_date".to_string(),
            message: m.to_string(),
        })?;

        let storage_type = input.storage_type.unwrap_or(StorageType::Normal);
        let expiry_date = calculate_expiry_date(
            input.harvest_date,
            PROVISIONAL_GRADE,
            storage_type,
            &input.product_id,
        )
        .map_err(|e| AppError::Validation {
            field: "product_id".to_string(),
            message: e.to_string(),
        })?;
        let shelf_life_days =
            expected_shelf_life_days(PROVISIONAL_GRADE, storage_type, &input.product_id).map_err(
                |e| AppError::Validation {
                    field: "product_id".to_string(),
                    message: e.to_string(),
                },
            )?;

        let now = self.clock.now();
        let crate_count = kg_to_crates(input.quantity_kg, &input.product_id);
        let batch = Batch {
            id: Uuid::new_v4(),
            product_id: input.product_id,
            farmer_id: input.farmer_id,
            harvest_date: input.harvest_date,
            quantity_kg: input.quantity_kg,
            grade: None,
            status: BatchStatus::Registered,
            warehouse_id: None,
            crate_count,
            pricing: None,
            created_at: now,
            updated_at: now,
        };
        let storage = StorageRecord {
            batch_id: batch.id,
            storage_type,
            entry_date: today,
            expiry_date,
            expected_shelf_life_days: shelf_life_days,
        };

        store::put_json(self.store.as_ref(), &keys::batch(batch.id), &batch).await?;
        store::put_json(self.store.as_ref(), &keys::storage(batch.id), &storage).await?;

        tracing::info!(
            batch_id = %batch.id,
            product_id = %batch.product_id,
            quantity_kg = %batch.quantity_kg,
            expiry = %storage.expiry_date,
            "batch registered"
        );

        Ok(RegisteredBatch { batch, storage })
    }

    /// Get a batch by id
    pub async fn get_batch(&self, batch_id: Uuid) -> AppResult<Batch> {
        store::get_json(self.store.as_ref(), &keys::batch(batch_id))
            .await?
            .ok_or_else(|| AppError::NotFound("Batch".to_string()))
    }

    /// Get a batch's storage record
    pub async fn get_storage(&self, batch_id: Uuid) -> AppResult<StorageRecord> {
        store::get_json(self.store.as_ref(), &keys::storage(batch_id))
            .await?
            .ok_or_else(|| AppError::NotFound("Storage record".to_string()))
    }

    /// List all batches
    pub async fn list_batches(&self) -> AppResult<Vec<Batch>> {
        store::scan_json(self.store.as_ref(), keys::BATCH_PREFIX).await
    }
}
