//! Product catalog queries

use shared::{catalog, Product};

use crate::error::{AppError, AppResult};

/// Read-only view over the static product catalog
#[derive(Clone, Default)]
pub struct CatalogService;

impl CatalogService {
    pub fn new() -> Self {
        Self
    }

    /// All products
    pub fn list_products(&self) -> &'static [Product] {
        catalog::PRODUCTS
    }

    /// A single product by id
    pub fn get_product(&self, product_id: &str) -> AppResult<&'static Product> {
        catalog::find_product(product_id)
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }
}
