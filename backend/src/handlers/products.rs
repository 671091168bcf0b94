//! HTTP handlers for the product catalog

use axum::{extract::Path, Json};

use shared::Product;

use crate::error::AppResult;
use crate::services::CatalogService;

/// List the product catalog
pub async fn list_products() -> Json<Vec<Product>> {
    Json(CatalogService::new().list_products().to_vec())
}

/// Get a catalog product by id
pub async fn get_product(Path(product_id): Path<String>) -> AppResult<Json<Product>> {
    let product = CatalogService::new().get_product(&product_id)?;
    Ok(Json(*product))
}
