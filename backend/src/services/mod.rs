//! Business logic services for the FreshChain platform

pub mod catalog;
pub mod dispatch;
pub mod fulfillment;
pub mod grading;
pub mod intake;
pub mod pricing;
pub mod retail;
pub mod warehouse;

pub use catalog::CatalogService;
pub use dispatch::{DispatchPlanner, RoundRobinDispatcher};
pub use fulfillment::FulfillmentService;
pub use grading::GradingService;
pub use intake::IntakeService;
pub use pricing::PriceOracle;
pub use retail::RetailService;
pub use warehouse::WarehouseService;
