//! Order fulfillment service
//!
//! Places retailer orders against stored batches and fulfills them by
//! FIFO crate allocation. Allocation is atomic on failure: an order that
//! cannot be covered leaves every crate untouched. Fulfillment of the
//! same order id twice is a no-op on the retailer's ledger.

use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::{
    crates_to_kg, derive_retail_status, find_product, validate_requested_crates, Batch, Crate,
    CrateStatus, Order, OrderStatus, RetailerInventoryRecord, StorageRecord,
};

use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::locks::LockRegistry;
use crate::services::dispatch::DispatchPlanner;
use crate::services::warehouse::WarehouseService;
use crate::store::{self, keys, KeyValueStore};

/// Fulfillment service: order placement and FIFO crate allocation
#[derive(Clone)]
pub struct FulfillmentService {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    locks: Arc<LockRegistry>,
    dispatch: Arc<dyn DispatchPlanner>,
    warehouses: WarehouseService,
}

/// Input for placing an order
#[derive(Debug, Deserialize)]
pub struct PlaceOrderInput {
    pub retailer_id: Uuid,
    pub batch_id: Uuid,
    pub warehouse_id: Uuid,
    pub destination: String,
    pub requested_crates: u32,
}

/// Result of a successful fulfillment
#[derive(Debug, Serialize)]
pub struct FulfillmentOutcome {
    pub order: Order,
    pub inventory_record: RetailerInventoryRecord,
}

impl FulfillmentService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        locks: Arc<LockRegistry>,
        dispatch: Arc<dyn DispatchPlanner>,
        warehouses: WarehouseService,
    ) -> Self {
        Self {
            store,
            clock,
            locks,
            dispatch,
            warehouses,
        }
    }

    /// Place an order against a stored batch
    pub async fn place_order(&self, input: PlaceOrderInput) -> AppResult<Order> {
        validate_requested_crates(input.requested_crates).map_err(|m| AppError::Validation {
            field: "requested_crates".to_string(),
            message: m.to_string(),
        })?;

        let batch: Batch = store::get_json(self.store.as_ref(), &keys::batch(input.batch_id))
            .await?
            .ok_or_else(|| AppError::NotFound("Batch".to_string()))?;
        if !self
            .warehouses
            .validate_batch_in_warehouse(input.batch_id, input.warehouse_id)
            .await?
        {
            return Err(AppError::Validation {
                field: "batch_id".to_string(),
                message: "Batch is not available in this warehouse".to_string(),
            });
        }

        // the authoritative sale gate
        let storage: StorageRecord =
            store::get_json(self.store.as_ref(), &keys::storage(batch.id))
                .await?
                .ok_or_else(|| AppError::NotFound("Storage record".to_string()))?;
        let retail = derive_retail_status(&storage, self.clock.today());
        if !retail.sale_allowed {
            return Err(AppError::Validation {
                field: "batch_id".to_string(),
                message: "Batch has expired and cannot be sold".to_string(),
            });
        }

        let quantity_kg = crates_to_kg(input.requested_crates, &batch.product_id);
        let unit_price = batch
            .pricing
            .as_ref()
            .map(|p| p.retailer_price_per_unit)
            .or_else(|| find_product(&batch.product_id).map(|p| p.base_price_per_unit))
            .unwrap_or(0);
        let amount_due = (Decimal::from(unit_price) * quantity_kg)
            .ceil()
            .to_i64()
            .unwrap_or(i64::MAX);

        let order = Order {
            id: Uuid::new_v4(),
            retailer_id: input.retailer_id,
            batch_id: input.batch_id,
            source_warehouse_id: input.warehouse_id,
            destination: input.destination,
            requested_crates: input.requested_crates,
            quantity_kg,
            status: OrderStatus::Pending,
            unit_price,
            amount_due,
            paid: false,
            dispatch: None,
            created_at: self.clock.now(),
            fulfilled_at: None,
        };
        store::put_json(self.store.as_ref(), &keys::order(order.id), &order).await?;

        tracing::info!(
            order_id = %order.id,
            batch_id = %order.batch_id,
            crates = order.requested_crates,
            "order placed"
        );
        Ok(order)
    }

    /// Fulfill an order by FIFO crate allocation, atomic per warehouse
    pub async fn fulfill_order(&self, order_id: Uuid) -> AppResult<FulfillmentOutcome> {
        let order: Order = self.get_order(order_id).await?;
        let lock = self.locks.for_warehouse(order.source_warehouse_id).await;
        let _guard = lock.lock().await;

        // reload under the lock; another fulfillment may have run
        let mut order: Order = self.get_order(order_id).await?;
        if order.status == OrderStatus::Fulfilled {
            let record = self
                .inventory_record(order.retailer_id, order.batch_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Retailer inventory record".to_string()))?;
            return Ok(FulfillmentOutcome { order, inventory_record: record });
        }

        let mut batch: Batch = store::get_json(self.store.as_ref(), &keys::batch(order.batch_id))
            .await?
            .ok_or_else(|| AppError::NotFound("Batch".to_string()))?;

        // the increment is keyed by order id: if a previous run already
        // applied this order, finish stamping and return
        if let Some(record) = self.inventory_record(order.retailer_id, order.batch_id).await? {
            if record.applied_order_ids.contains(&order.id) {
                let order = self.stamp_fulfilled(order).await?;
                return Ok(FulfillmentOutcome { order, inventory_record: record });
            }
        }

        order.status = OrderStatus::Processing;
        store::put_json(self.store.as_ref(), &keys::order(order.id), &order).await?;

        // FIFO pool: stored crates of this batch in this warehouse,
        // oldest first
        let mut pool: Vec<Crate> =
            store::scan_json(self.store.as_ref(), &keys::crate_prefix(order.batch_id))
                .await?
                .into_iter()
                .filter(|c: &Crate| {
                    c.warehouse_id == order.source_warehouse_id && c.status == CrateStatus::Stored
                })
                .collect();
        pool.sort_by_key(Crate::fifo_key);

        let required_kg = crates_to_kg(order.requested_crates, &batch.product_id);
        let mut selected = Vec::new();
        let mut accumulated = Decimal::ZERO;
        for crate_unit in pool {
            if accumulated >= required_kg {
                break;
            }
            accumulated += crate_unit.quantity_kg;
            selected.push(crate_unit);
        }

        if accumulated < required_kg {
            // no partial mutation: the pool is exactly as it was
            order.status = OrderStatus::Rejected;
            store::put_json(self.store.as_ref(), &keys::order(order.id), &order).await?;
            tracing::warn!(
                order_id = %order.id,
                requested_kg = %required_kg,
                available_kg = %accumulated,
                "order rejected, insufficient stock"
            );
            return Err(AppError::InsufficientStock {
                requested_kg: required_kg,
                available_kg: accumulated,
            });
        }

        let now = self.clock.now();
        let allocated_crates = selected.len() as u32;
        let allocated_kg: Decimal = selected.iter().map(|c| c.quantity_kg).sum();
        for crate_unit in &mut selected {
            crate_unit.status = CrateStatus::InTransit;
            crate_unit.assigned_order_id = Some(order.id);
            store::put_json(
                self.store.as_ref(),
                &keys::crate_unit(crate_unit.batch_id, crate_unit.sequence),
                crate_unit,
            )
            .await?;
        }

        // legacy counter, kept for capacity statistics; availability is
        // crate-status-derived
        batch.crate_count = batch.crate_count.saturating_sub(order.requested_crates);
        batch.updated_at = now;
        store::put_json(self.store.as_ref(), &keys::batch(batch.id), &batch).await?;

        let record_key = keys::retail_inventory(order.retailer_id, order.batch_id);
        let mut record: RetailerInventoryRecord =
            store::get_json(self.store.as_ref(), &record_key)
                .await?
                .unwrap_or(RetailerInventoryRecord {
                    retailer_id: order.retailer_id,
                    batch_id: order.batch_id,
                    crates_owned: 0,
                    quantity_kg_owned: Decimal::ZERO,
                    quantity_kg_sold: Decimal::ZERO,
                    originating_order_id: order.id,
                    applied_order_ids: Vec::new(),
                    updated_at: now,
                });
        record.crates_owned += allocated_crates;
        record.quantity_kg_owned += allocated_kg;
        record.applied_order_ids.push(order.id);
        record.updated_at = now;
        store::put_json(self.store.as_ref(), &record_key, &record).await?;

        let order = self.stamp_fulfilled(order).await?;
        tracing::info!(
            order_id = %order.id,
            crates = allocated_crates,
            kg = %allocated_kg,
            "order fulfilled"
        );
        Ok(FulfillmentOutcome { order, inventory_record: record })
    }

    async fn stamp_fulfilled(&self, mut order: Order) -> AppResult<Order> {
        order.status = OrderStatus::Fulfilled;
        order.fulfilled_at = Some(self.clock.now());
        if order.dispatch.is_none() {
            order.dispatch = Some(self.dispatch.assign(&order));
        }
        store::put_json(self.store.as_ref(), &keys::order(order.id), &order).await?;
        Ok(order)
    }

    /// Get an order by id
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<Order> {
        store::get_json(self.store.as_ref(), &keys::order(order_id))
            .await?
            .ok_or_else(|| AppError::NotFound("Order".to_string()))
    }

    /// List all orders
    pub async fn list_orders(&self) -> AppResult<Vec<Order>> {
        store::scan_json(self.store.as_ref(), keys::ORDER_PREFIX).await
    }

    async fn inventory_record(
        &self,
        retailer_id: Uuid,
        batch_id: Uuid,
    ) -> AppResult<Option<RetailerInventoryRecord>> {
        store::get_json(
            self.store.as_ref(),
            &keys::retail_inventory(retailer_id, batch_id),
        )
        .await
    }
}
