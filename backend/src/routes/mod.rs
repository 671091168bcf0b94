//! Route definitions for the FreshChain API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Product catalog
        .nest("/products", product_routes())
        // Batch intake, testing, and grading
        .nest("/batches", batch_routes())
        // Warehouse capacity and admission
        .nest("/warehouses", warehouse_routes())
        // Retailer orders and fulfillment
        .nest("/orders", order_routes())
        // Retailer inventory and point of sale
        .nest("/retailers", retailer_routes())
        // Market price table
        .nest("/market-prices", price_routes())
}

/// Product catalog routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products))
        .route("/:product_id", get(handlers::get_product))
}

/// Batch lifecycle routes
fn batch_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_batches).post(handlers::register_batch))
        .route("/:batch_id", get(handlers::get_batch))
        .route("/:batch_id/storage", get(handlers::get_batch_storage))
        .route("/:batch_id/test-request", post(handlers::request_quality_test))
        .route("/:batch_id/grade", post(handlers::record_grading))
        .route("/:batch_id/freshness", get(handlers::get_batch_freshness))
        .route("/:batch_id/pricing", get(handlers::get_batch_pricing))
}

/// Warehouse routes
fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_warehouses).post(handlers::register_warehouse),
        )
        .route("/:warehouse_id/capacity", get(handlers::get_warehouse_capacity))
        .route("/:warehouse_id/batches", post(handlers::admit_batch))
        .route(
            "/:warehouse_id/batches/:batch_id/crates",
            get(handlers::list_batch_crates),
        )
}

/// Order routes
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::place_order))
        .route("/:order_id", get(handlers::get_order))
        .route("/:order_id/fulfill", post(handlers::fulfill_order))
}

/// Retailer routes
fn retailer_routes() -> Router<AppState> {
    Router::new()
        .route("/:retailer_id/inventory", get(handlers::get_retailer_inventory))
        .route("/:retailer_id/sales", post(handlers::record_sale))
        .route("/:retailer_id/waste-report", get(handlers::get_waste_report))
}

/// Market price routes
fn price_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_market_prices))
        .route("/modal", get(handlers::get_modal_price))
}
