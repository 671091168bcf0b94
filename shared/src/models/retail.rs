//! Retail-side models: freshness state and the retailer's own ledger

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Freshness state derived from remaining shelf life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessStatus {
    Fresh,
    ConsumeSoon,
    Expired,
}

impl std::fmt::Display for FreshnessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FreshnessStatus::Fresh => write!(f, "Fresh"),
            FreshnessStatus::ConsumeSoon => write!(f, "Consume Soon"),
            FreshnessStatus::Expired => write!(f, "Expired"),
        }
    }
}

/// Derived retail view of a batch, recomputed on every read, never
/// stored authoritatively
#[derive(Debug, Clone, Serialize)]
pub struct RetailStatus {
    pub batch_id: Uuid,
    pub expiry_date: NaiveDate,
    /// Negative once expired; callers must not clamp before checking
    pub remaining_days: i64,
    pub status: FreshnessStatus,
    pub sale_allowed: bool,
}

/// The retailer's own stock ledger, keyed by (retailer, batch)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetailerInventoryRecord {
    pub retailer_id: Uuid,
    pub batch_id: Uuid,
    pub crates_owned: u32,
    pub quantity_kg_owned: Decimal,
    pub quantity_kg_sold: Decimal,
    pub originating_order_id: Uuid,
    /// Order ids already applied to this record; makes fulfillment
    /// increments idempotent
    pub applied_order_ids: Vec<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl RetailerInventoryRecord {
    /// Owned minus sold; never negative while the sold <= owned
    /// invariant holds
    pub fn available_kg(&self) -> Decimal {
        self.quantity_kg_owned - self.quantity_kg_sold
    }
}
