//! Product catalog models

use serde::{Deserialize, Serialize};

/// Unit a product is sold in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleUnit {
    Kg,
    Dozen,
    Piece,
}

impl SaleUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleUnit::Kg => "kg",
            SaleUnit::Dozen => "dozen",
            SaleUnit::Piece => "piece",
        }
    }
}

/// Product category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Vegetable,
    Fruit,
    LeafyGreen,
}

/// Static catalog entry for a perishable product
///
/// Immutable reference data; products have no lifecycle. The shelf-life
/// modifier scales the grade baseline (values below 1.0 spoil faster,
/// above 1.0 keep longer).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Product {
    pub id: &'static str,
    pub name: &'static str,
    pub sale_unit: SaleUnit,
    pub category: ProductCategory,
    /// Smallest crate fill accepted at intake, in kg
    pub crate_capacity_min_kg: u32,
    /// Largest crate fill accepted at intake, in kg
    pub crate_capacity_max_kg: u32,
    /// Capacity used for all kg/crate conversions
    pub crate_capacity_default_kg: u32,
    /// Fallback unit price when no market row is available
    pub base_price_per_unit: i64,
    pub shelf_life_modifier: f64,
    /// Commodity name in the external market price table
    pub commodity: &'static str,
}
