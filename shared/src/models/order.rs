//! Retailer order models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order state machine: Pending -> Processing -> Fulfilled, with
/// Rejected for orders that failed allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Fulfilled,
    Rejected,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Fulfilled => "fulfilled",
            OrderStatus::Rejected => "rejected",
        }
    }
}

/// Driver/vehicle assigned at fulfillment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchAssignment {
    pub driver: String,
    pub vehicle: String,
}

/// A retailer's request against a specific batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub retailer_id: Uuid,
    pub batch_id: Uuid,
    pub source_warehouse_id: Uuid,
    pub destination: String,
    pub requested_crates: u32,
    /// Derived: requested crates x the product's crate capacity
    pub quantity_kg: Decimal,
    pub status: OrderStatus,
    pub unit_price: i64,
    pub amount_due: i64,
    pub paid: bool,
    pub dispatch: Option<DispatchAssignment>,
    pub created_at: DateTime<Utc>,
    pub fulfilled_at: Option<DateTime<Utc>>,
}
