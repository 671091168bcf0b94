//! HTTP handlers for the FreshChain API

mod batches;
mod health;
mod orders;
mod prices;
mod products;
mod retailers;
mod warehouses;

pub use batches::*;
pub use health::*;
pub use orders::*;
pub use prices::*;
pub use products::*;
pub use retailers::*;
pub use warehouses::*;
