//! Shared types and rules for the FreshChain platform
//!
//! This crate contains the pure domain logic shared between the backend
//! and other components of the system: the product catalog, freshness and
//! expiry rules, mass/crate conversion, and three-tier pricing.

pub mod catalog;
pub mod freshness;
pub mod models;
pub mod pricing;
pub mod units;
pub mod validation;

pub use catalog::{commodity_for_product, find_product};
pub use freshness::*;
pub use models::*;
pub use pricing::*;
pub use units::*;
pub use validation::*;
