//! Static product catalog
//!
//! Reference data for the perishable products the platform handles. The
//! catalog is compiled in; products are immutable and have no lifecycle.

use crate::models::{Product, ProductCategory, SaleUnit};

/// All products known to the platform
pub const PRODUCTS: &[Product] = &[
    Product {
        id: "tomato",
        name: "Tomato",
        sale_unit: SaleUnit::Kg,
        category: ProductCategory::Vegetable,
        crate_capacity_min_kg: 10,
        crate_capacity_max_kg: 15,
        crate_capacity_default_kg: 12,
        base_price_per_unit: 25,
        shelf_life_modifier: 1.0,
        commodity: "Tomato",
    },
    Product {
        id: "potato",
        name: "Potato",
        sale_unit: SaleUnit::Kg,
        category: ProductCategory::Vegetable,
        crate_capacity_min_kg: 20,
        crate_capacity_max_kg: 30,
        crate_capacity_default_kg: 25,
        base_price_per_unit: 18,
        shelf_life_modifier: 4.0,
        commodity: "Potato",
    },
    Product {
        id: "onion",
        name: "Onion",
        sale_unit: SaleUnit::Kg,
        category: ProductCategory::Vegetable,
        crate_capacity_min_kg: 15,
        crate_capacity_max_kg: 25,
        crate_capacity_default_kg: 20,
        base_price_per_unit: 22,
        shelf_life_modifier: 3.0,
        commodity: "Onion",
    },
    Product {
        id: "carrot",
        name: "Carrot",
        sale_unit: SaleUnit::Kg,
        category: ProductCategory::Vegetable,
        crate_capacity_min_kg: 12,
        crate_capacity_max_kg: 18,
        crate_capacity_default_kg: 15,
        base_price_per_unit: 30,
        shelf_life_modifier: 1.5,
        commodity: "Carrot",
    },
    Product {
        id: "cabbage",
        name: "Cabbage",
        sale_unit: SaleUnit::Piece,
        category: ProductCategory::Vegetable,
        crate_capacity_min_kg: 15,
        crate_capacity_max_kg: 25,
        crate_capacity_default_kg: 20,
        base_price_per_unit: 15,
        shelf_life_modifier: 1.2,
        commodity: "Cabbage",
    },
    Product {
        id: "spinach",
        name: "Spinach",
        sale_unit: SaleUnit::Kg,
        category: ProductCategory::LeafyGreen,
        crate_capacity_min_kg: 6,
        crate_capacity_max_kg: 10,
        crate_capacity_default_kg: 8,
        base_price_per_unit: 35,
        shelf_life_modifier: 0.4,
        commodity: "Spinach",
    },
    Product {
        id: "apple",
        name: "Apple",
        sale_unit: SaleUnit::Kg,
        category: ProductCategory::Fruit,
        crate_capacity_min_kg: 15,
        crate_capacity_max_kg: 20,
        crate_capacity_default_kg: 18,
        base_price_per_unit: 90,
        shelf_life_modifier: 2.0,
        commodity: "Apple",
    },
    Product {
        id: "banana",
        name: "Banana",
        sale_unit: SaleUnit::Dozen,
        category: ProductCategory::Fruit,
        crate_capacity_min_kg: 12,
        crate_capacity_max_kg: 18,
        crate_capacity_default_kg: 15,
        base_price_per_unit: 40,
        shelf_life_modifier: 0.8,
        commodity: "Banana",
    },
    Product {
        id: "mango",
        name: "Mango",
        sale_unit: SaleUnit::Kg,
        category: ProductCategory::Fruit,
        crate_capacity_min_kg: 10,
        crate_capacity_max_kg: 15,
        crate_capacity_default_kg: 12,
        base_price_per_unit: 70,
        shelf_life_modifier: 0.9,
        commodity: "Mango",
    },
];

/// Look up a product by id
pub fn find_product(product_id: &str) -> Option<&'static Product> {
    PRODUCTS.iter().find(|p| p.id == product_id)
}

/// Commodity name in the market price table for a product, if known
pub fn commodity_for_product(product_id: &str) -> Option<&'static str> {
    find_product(product_id).map(|p| p.commodity)
}
