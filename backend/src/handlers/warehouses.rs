//! HTTP handlers for warehouse endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::{Batch, Crate, Warehouse, WarehouseCapacity};

use crate::error::AppResult;
use crate::services::warehouse::RegisterWarehouseInput;
use crate::services::WarehouseService;
use crate::AppState;

fn warehouse_service(state: &AppState) -> WarehouseService {
    WarehouseService::new(
        state.store.clone(),
        state.clock.clone(),
        state.locks.clone(),
        state.config.warehouse.default_capacity_crates,
    )
}

/// Input for admitting a batch into a warehouse
#[derive(Debug, Deserialize)]
pub struct AdmitBatchInput {
    pub batch_id: Uuid,
}

/// Register a warehouse
pub async fn register_warehouse(
    State(state): State<AppState>,
    Json(input): Json<RegisterWarehouseInput>,
) -> AppResult<Json<Warehouse>> {
    let warehouse = warehouse_service(&state).register_warehouse(input).await?;
    Ok(Json(warehouse))
}

/// List all warehouses
pub async fn list_warehouses(State(state): State<AppState>) -> AppResult<Json<Vec<Warehouse>>> {
    let warehouses = warehouse_service(&state).list_warehouses().await?;
    Ok(Json(warehouses))
}

/// Used / total / available capacity for a warehouse
pub async fn get_warehouse_capacity(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<WarehouseCapacity>> {
    let capacity = warehouse_service(&state)
        .warehouse_capacity(warehouse_id)
        .await?;
    Ok(Json(capacity))
}

/// Admit a tested batch into a warehouse
pub async fn admit_batch(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
    Json(input): Json<AdmitBatchInput>,
) -> AppResult<Json<Batch>> {
    let batch = warehouse_service(&state)
        .add_batch_to_warehouse(input.batch_id, warehouse_id)
        .await?;
    Ok(Json(batch))
}

/// Crates of a batch held in a warehouse
pub async fn list_batch_crates(
    State(state): State<AppState>,
    Path((warehouse_id, batch_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Vec<Crate>>> {
    let crates = warehouse_service(&state)
        .crates_for_batch(batch_id, warehouse_id)
        .await?;
    Ok(Json(crates))
}
