//! Storage models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage method for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    Normal,
    Cold,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Normal => "normal",
            StorageType::Cold => "cold",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(StorageType::Normal),
            "cold" => Some(StorageType::Cold),
            _ => None,
        }
    }
}

/// Storage record, 1:1 with a batch
///
/// Created at intake with a provisional expiry (default grade) and
/// overwritten at grading with the final grade's expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageRecord {
    pub batch_id: Uuid,
    pub storage_type: StorageType,
    pub entry_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub expected_shelf_life_days: i64,
}
