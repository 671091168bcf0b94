//! HTTP handlers for market price endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::MarketPriceRow;

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Query for the modal price lookup
#[derive(Debug, Deserialize)]
pub struct ModalPriceQuery {
    pub product_id: String,
    pub warehouse_id: Uuid,
}

/// Current market price table, cache-mediated
pub async fn list_market_prices(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<MarketPriceRow>>> {
    let rows = state.oracle.load_market_prices().await?;
    Ok(Json(rows))
}

/// Latest modal price row for a product in a warehouse's market
pub async fn get_modal_price(
    State(state): State<AppState>,
    Query(query): Query<ModalPriceQuery>,
) -> AppResult<Json<MarketPriceRow>> {
    let row = state
        .oracle
        .modal_row_for_warehouse(&query.product_id, query.warehouse_id)
        .await?
        .ok_or_else(|| {
            AppError::PriceUnavailable(format!(
                "No market price for product {} in warehouse {}",
                query.product_id, query.warehouse_id
            ))
        })?;
    Ok(Json(row))
}
