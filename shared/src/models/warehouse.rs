//! Warehouse models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StorageType;

/// A physical warehouse holding crated stock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    /// Market name in the external price table this warehouse trades
    /// against
    pub market_name: String,
    pub total_capacity_crates: u32,
    pub storage_type: StorageType,
    pub created_at: DateTime<Utc>,
}

/// Capacity snapshot for a warehouse
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WarehouseCapacity {
    pub warehouse_id: Uuid,
    pub used_crates: u32,
    pub total_crates: u32,
    pub available_crates: u32,
}
