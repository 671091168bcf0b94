//! HTTP handlers for retailer-side endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use shared::RetailerInventoryRecord;

use crate::error::AppResult;
use crate::services::retail::{RecordSaleInput, RetailerInventoryView, WasteReport};
use crate::services::RetailService;
use crate::AppState;

fn retail_service(state: &AppState) -> RetailService {
    RetailService::new(
        state.store.clone(),
        state.clock.clone(),
        state.config.freshness.consume_soon_threshold_days,
        state.config.freshness.waste_estimate_ratio,
    )
}

/// The retailer's stock with derived freshness per batch
pub async fn get_retailer_inventory(
    State(state): State<AppState>,
    Path(retailer_id): Path<Uuid>,
) -> AppResult<Json<Vec<RetailerInventoryView>>> {
    let views = retail_service(&state).inventory(retailer_id).await?;
    Ok(Json(views))
}

/// Record a point-of-sale transaction
pub async fn record_sale(
    State(state): State<AppState>,
    Path(retailer_id): Path<Uuid>,
    Json(input): Json<RecordSaleInput>,
) -> AppResult<Json<RetailerInventoryRecord>> {
    let record = retail_service(&state).record_sale(retailer_id, input).await?;
    Ok(Json(record))
}

/// Consume-soon stock and the waste-prevented estimate
pub async fn get_waste_report(
    State(state): State<AppState>,
    Path(retailer_id): Path<Uuid>,
) -> AppResult<Json<WasteReport>> {
    let report = retail_service(&state).waste_report(retailer_id).await?;
    Ok(Json(report))
}
