//! Warehouse ledger service
//!
//! Tracks warehouses, their crate capacity, and the batches stored in
//! them. Admission is the primary over-commit risk: the capacity check
//! and the assignment run under the warehouse lock so two concurrent
//! intakes can never both fit into the last free crates.

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use shared::{
    crate_capacity_kg, kg_to_crates, Batch, BatchStatus, Crate, CrateStatus, StorageType,
    Warehouse, WarehouseCapacity,
};

use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::locks::LockRegistry;
use crate::store::{self, keys, KeyValueStore};

/// Warehouse ledger service
#[derive(Clone)]
pub struct WarehouseService {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    locks: Arc<LockRegistry>,
    default_capacity_crates: u32,
}

/// Input for registering a warehouse
#[derive(Debug, Deserialize)]
pub struct RegisterWarehouseInput {
    pub name: String,
    pub location: String,
    /// Market name in the external price table
    pub market_name: String,
    #[serde(default)]
    pub total_capacity_crates: Option<u32>,
    #[serde(default)]
    pub storage_type: Option<StorageType>,
}

impl WarehouseService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        locks: Arc<LockRegistry>,
        default_capacity_crates: u32,
    ) -> Self {
        Self {
            store,
            clock,
            locks,
            default_capacity_crates,
        }
    }

    /// Register a warehouse
    pub async fn register_warehouse(&self, input: RegisterWarehouseInput) -> AppResult<Warehouse> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Warehouse name is required".to_string(),
            });
        }
        if input.market_name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "market_name".to_string(),
                message: "Market name is required".to_string(),
            });
        }

        let warehouse = Warehouse {
            id: Uuid::new_v4(),
            name: input.name,
            location: input.location,
            market_name: input.market_name,
            total_capacity_crates: input
                .total_capacity_crates
                .unwrap_or(self.default_capacity_crates),
            storage_type: input.storage_type.unwrap_or(StorageType::Normal),
            created_at: self.clock.now(),
        };
        store::put_json(self.store.as_ref(), &keys::warehouse(warehouse.id), &warehouse).await?;

        tracing::info!(
            warehouse_id = %warehouse.id,
            name = %warehouse.name,
            capacity = warehouse.total_capacity_crates,
            "warehouse registered"
        );
        Ok(warehouse)
    }

    /// Get a warehouse by id
    pub async fn get_warehouse(&self, warehouse_id: Uuid) -> AppResult<Warehouse> {
        store::get_json(self.store.as_ref(), &keys::warehouse(warehouse_id))
            .await?
            .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))
    }

    /// List all warehouses
    pub async fn list_warehouses(&self) -> AppResult<Vec<Warehouse>> {
        store::scan_json(self.store.as_ref(), keys::WAREHOUSE_PREFIX).await
    }

    /// Used / total / available crate capacity for a warehouse
    pub async fn warehouse_capacity(&self, warehouse_id: Uuid) -> AppResult<WarehouseCapacity> {
        let warehouse = self.get_warehouse(warehouse_id).await?;
        let batches: Vec<Batch> = store::scan_json(self.store.as_ref(), keys::BATCH_PREFIX).await?;
        let used: u32 = batches
            .iter()
            .filter(|b| b.warehouse_id == Some(warehouse_id) && b.status.occupies_warehouse())
            .map(|b| b.crate_count)
            .sum();

        Ok(WarehouseCapacity {
            warehouse_id,
            used_crates: used,
            total_crates: warehouse.total_capacity_crates,
            available_crates: warehouse.total_capacity_crates.saturating_sub(used),
        })
    }

    /// Admit a tested batch: capacity check, assignment, and crate
    /// carving, atomic per warehouse
    pub async fn add_batch_to_warehouse(
        &self,
        batch_id: Uuid,
        warehouse_id: Uuid,
    ) -> AppResult<Batch> {
        let lock = self.locks.for_warehouse(warehouse_id).await;
        let _guard = lock.lock().await;

        let mut batch: Batch = store::get_json(self.store.as_ref(), &keys::batch(batch_id))
            .await?
            .ok_or_else(|| AppError::NotFound("Batch".to_string()))?;

        if batch.status != BatchStatus::Tested {
            return Err(AppError::InvalidStateTransition(format!(
                "Batch must be tested before storage, current status: {}",
                batch.status.as_str()
            )));
        }

        let capacity = self.warehouse_capacity(warehouse_id).await?;
        let crate_count = kg_to_crates(batch.quantity_kg, &batch.product_id);
        if crate_count > capacity.available_crates {
            return Err(AppError::CapacityExceeded {
                requested: crate_count,
                available: capacity.available_crates,
            });
        }

        let now = self.clock.now();
        let per_crate = crate_capacity_kg(&batch.product_id);
        let mut remaining = batch.quantity_kg;
        for sequence in 1..=crate_count {
            let quantity_kg = remaining.min(per_crate);
            let crate_unit = Crate {
                id: Uuid::new_v4(),
                batch_id,
                warehouse_id,
                quantity_kg,
                sequence,
                status: CrateStatus::Stored,
                assigned_order_id: None,
                created_at: now,
            };
            store::put_json(
                self.store.as_ref(),
                &keys::crate_unit(batch_id, sequence),
                &crate_unit,
            )
            .await?;
            remaining -= quantity_kg;
        }

        batch.warehouse_id = Some(warehouse_id);
        batch.crate_count = crate_count;
        batch.status = BatchStatus::Stored;
        batch.updated_at = now;
        store::put_json(self.store.as_ref(), &keys::batch(batch.id), &batch).await?;

        tracing::info!(
            batch_id = %batch.id,
            warehouse_id = %warehouse_id,
            crates = crate_count,
            "batch admitted to warehouse"
        );
        Ok(batch)
    }

    /// Whether the batch exists, is assigned to the warehouse, and has a
    /// non-terminal status
    pub async fn validate_batch_in_warehouse(
        &self,
        batch_id: Uuid,
        warehouse_id: Uuid,
    ) -> AppResult<bool> {
        let batch: Option<Batch> =
            store::get_json(self.store.as_ref(), &keys::batch(batch_id)).await?;
        Ok(batch
            .map(|b| b.warehouse_id == Some(warehouse_id) && b.status.occupies_warehouse())
            .unwrap_or(false))
    }

    /// Crates of a batch held in a warehouse, in carving order
    pub async fn crates_for_batch(
        &self,
        batch_id: Uuid,
        warehouse_id: Uuid,
    ) -> AppResult<Vec<Crate>> {
        let crates: Vec<Crate> =
            store::scan_json(self.store.as_ref(), &keys::crate_prefix(batch_id)).await?;
        Ok(crates
            .into_iter()
            .filter(|c| c.warehouse_id == warehouse_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    use shared::QualityGrade;

    use crate::clock::FixedClock;
    use crate::store::MemoryStore;

    fn service(store: Arc<MemoryStore>) -> WarehouseService {
        let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()));
        WarehouseService::new(store, clock, Arc::new(LockRegistry::new()), 100)
    }

    /// Write a tested tomato batch straight into the store
    async fn tested_batch(store: &MemoryStore, quantity_kg: u32) -> Batch {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let quantity = Decimal::from(quantity_kg);
        let batch = Batch {
            id: Uuid::new_v4(),
            product_id: "tomato".to_string(),
            farmer_id: Uuid::new_v4(),
            harvest_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            quantity_kg: quantity,
            grade: Some(QualityGrade::B),
            status: BatchStatus::Tested,
            warehouse_id: None,
            crate_count: kg_to_crates(quantity, "tomato"),
            pricing: None,
            created_at: now,
            updated_at: now,
        };
        store::put_json(store, &keys::batch(batch.id), &batch).await.unwrap();
        batch
    }

    async fn warehouse_with_capacity(service: &WarehouseService, capacity: u32) -> Warehouse {
        service
            .register_warehouse(RegisterWarehouseInput {
                name: "Central Warehouse".to_string(),
                location: "Central".to_string(),
                market_name: "Central Market".to_string(),
                total_capacity_crates: Some(capacity),
                storage_type: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn admission_respects_capacity() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());
        let warehouse = warehouse_with_capacity(&service, 100).await;

        // 1140 kg of tomato = 95 crates
        let big = tested_batch(&store, 1140).await;
        service.add_batch_to_warehouse(big.id, warehouse.id).await.unwrap();
        let capacity = service.warehouse_capacity(warehouse.id).await.unwrap();
        assert_eq!(capacity.used_crates, 95);
        assert_eq!(capacity.available_crates, 5);

        // 6 more crates (72 kg) exceed the capacity
        let over = tested_batch(&store, 72).await;
        let err = service.add_batch_to_warehouse(over.id, warehouse.id).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::CapacityExceeded { requested: 6, available: 5 }
        ));

        // 5 crates (60 kg) fill it exactly
        let fits = tested_batch(&store, 60).await;
        service.add_batch_to_warehouse(fits.id, warehouse.id).await.unwrap();
        let capacity = service.warehouse_capacity(warehouse.id).await.unwrap();
        assert_eq!(capacity.used_crates, 100);
        assert_eq!(capacity.available_crates, 0);
    }

    #[tokio::test]
    async fn carving_splits_the_remainder_into_the_last_crate() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());
        let warehouse = warehouse_with_capacity(&service, 100).await;

        // 30 kg of tomato -> 3 crates: 12 + 12 + 6
        let batch = tested_batch(&store, 30).await;
        service.add_batch_to_warehouse(batch.id, warehouse.id).await.unwrap();

        let crates = service.crates_for_batch(batch.id, warehouse.id).await.unwrap();
        assert_eq!(crates.len(), 3);
        assert_eq!(crates[0].quantity_kg, Decimal::from(12));
        assert_eq!(crates[1].quantity_kg, Decimal::from(12));
        assert_eq!(crates[2].quantity_kg, Decimal::from(6));
        let total: Decimal = crates.iter().map(|c| c.quantity_kg).sum();
        assert_eq!(total, Decimal::from(30));
    }

    #[tokio::test]
    async fn untested_batches_are_not_admitted() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());
        let warehouse = warehouse_with_capacity(&service, 100).await;

        let mut batch = tested_batch(&store, 60).await;
        batch.status = BatchStatus::Registered;
        store::put_json(store.as_ref(), &keys::batch(batch.id), &batch).await.unwrap();

        let err = service.add_batch_to_warehouse(batch.id, warehouse.id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidStateTransition(_)));
    }

    #[tokio::test]
    async fn validate_batch_in_warehouse_checks_assignment() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());
        let warehouse = warehouse_with_capacity(&service, 100).await;

        let batch = tested_batch(&store, 60).await;
        assert!(!service.validate_batch_in_warehouse(batch.id, warehouse.id).await.unwrap());

        service.add_batch_to_warehouse(batch.id, warehouse.id).await.unwrap();
        assert!(service.validate_batch_in_warehouse(batch.id, warehouse.id).await.unwrap());
        assert!(!service
            .validate_batch_in_warehouse(batch.id, Uuid::new_v4())
            .await
            .unwrap());
    }
}
