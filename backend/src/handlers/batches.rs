//! HTTP handlers for batch intake, testing, and grading endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use shared::{Batch, BatchPricing, RetailStatus, StorageRecord};

use crate::error::{AppError, AppResult};
use crate::services::grading::RecordGradingInput;
use crate::services::intake::{RegisterBatchInput, RegisteredBatch};
use crate::services::{GradingService, IntakeService, RetailService};
use crate::AppState;

fn intake_service(state: &AppState) -> IntakeService {
    IntakeService::new(state.store.clone(), state.clock.clone())
}

/// Register a harvested batch
pub async fn register_batch(
    State(state): State<AppState>,
    Json(input): Json<RegisterBatchInput>,
) -> AppResult<Json<RegisteredBatch>> {
    let registered = intake_service(&state).register_batch(input).await?;
    Ok(Json(registered))
}

/// List all batches
pub async fn list_batches(State(state): State<AppState>) -> AppResult<Json<Vec<Batch>>> {
    let batches = intake_service(&state).list_batches().await?;
    Ok(Json(batches))
}

/// Get a batch by id
pub async fn get_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<Batch>> {
    let batch = intake_service(&state).get_batch(batch_id).await?;
    Ok(Json(batch))
}

/// Queue a batch for quality testing
pub async fn request_quality_test(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<Batch>> {
    let service = GradingService::new(state.store, state.clock, state.oracle);
    let batch = service.request_quality_test(batch_id).await?;
    Ok(Json(batch))
}

/// Record the lab grade for a batch
pub async fn record_grading(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
    Json(input): Json<RecordGradingInput>,
) -> AppResult<Json<Batch>> {
    let service = GradingService::new(state.store, state.clock, state.oracle);
    let batch = service.record_grading(batch_id, input).await?;
    Ok(Json(batch))
}

/// Storage record for a batch (entry date, expiry, shelf life)
pub async fn get_batch_storage(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<StorageRecord>> {
    let storage = intake_service(&state).get_storage(batch_id).await?;
    Ok(Json(storage))
}

/// Derived freshness view of a batch
pub async fn get_batch_freshness(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<RetailStatus>> {
    let service = RetailService::new(
        state.store,
        state.clock,
        state.config.freshness.consume_soon_threshold_days,
        state.config.freshness.waste_estimate_ratio,
    );
    let status = service.batch_retail_status(batch_id).await?;
    Ok(Json(status))
}

/// Pricing snapshot attached to a batch at grading
pub async fn get_batch_pricing(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<BatchPricing>> {
    let batch = intake_service(&state).get_batch(batch_id).await?;
    let pricing = batch.pricing.ok_or_else(|| {
        AppError::PriceUnavailable(format!("Batch {} has no pricing snapshot", batch_id))
    })?;
    Ok(Json(pricing))
}
