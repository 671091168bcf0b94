//! HTTP handlers for order endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use shared::Order;

use crate::error::AppResult;
use crate::services::fulfillment::{FulfillmentOutcome, PlaceOrderInput};
use crate::services::{FulfillmentService, WarehouseService};
use crate::AppState;

fn fulfillment_service(state: &AppState) -> FulfillmentService {
    let warehouses = WarehouseService::new(
        state.store.clone(),
        state.clock.clone(),
        state.locks.clone(),
        state.config.warehouse.default_capacity_crates,
    );
    FulfillmentService::new(
        state.store.clone(),
        state.clock.clone(),
        state.locks.clone(),
        state.dispatch.clone(),
        warehouses,
    )
}

/// Place a retailer order against a stored batch
pub async fn place_order(
    State(state): State<AppState>,
    Json(input): Json<PlaceOrderInput>,
) -> AppResult<Json<Order>> {
    let order = fulfillment_service(&state).place_order(input).await?;
    Ok(Json(order))
}

/// List all orders
pub async fn list_orders(State(state): State<AppState>) -> AppResult<Json<Vec<Order>>> {
    let orders = fulfillment_service(&state).list_orders().await?;
    Ok(Json(orders))
}

/// Get an order by id
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Order>> {
    let order = fulfillment_service(&state).get_order(order_id).await?;
    Ok(Json(order))
}

/// Fulfill an order by FIFO crate allocation
pub async fn fulfill_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<FulfillmentOutcome>> {
    let outcome = fulfillment_service(&state).fulfill_order(order_id).await?;
    Ok(Json(outcome))
}
