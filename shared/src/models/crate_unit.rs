//! Crate models: the discrete handling unit carved from a batch

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Physical crate state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrateStatus {
    Stored,
    InTransit,
}

impl CrateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrateStatus::Stored => "stored",
            CrateStatus::InTransit => "in_transit",
        }
    }
}

/// A discrete handling unit carved from a batch's mass
///
/// Crates of the same batch form the pool FIFO allocation draws from,
/// ordered oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crate {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub warehouse_id: Uuid,
    pub quantity_kg: Decimal,
    /// Position within the batch's carving run; makes FIFO order total
    /// even when several crates share a creation timestamp
    pub sequence: u32,
    pub status: CrateStatus,
    pub assigned_order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Crate {
    /// FIFO ordering key, oldest first
    pub fn fifo_key(&self) -> (DateTime<Utc>, u32) {
        (self.created_at, self.sequence)
    }
}
