//! Batch lifecycle models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::BatchPricing;

/// Quality grade assigned at testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityGrade {
    A,
    B,
    C,
}

impl QualityGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityGrade::A => "A",
            QualityGrade::B => "B",
            QualityGrade::C => "C",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "A" | "a" => Some(QualityGrade::A),
            "B" | "b" => Some(QualityGrade::B),
            "C" | "c" => Some(QualityGrade::C),
            _ => None,
        }
    }

    /// All grades, best first
    pub fn all() -> [QualityGrade; 3] {
        [QualityGrade::A, QualityGrade::B, QualityGrade::C]
    }
}

impl std::fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Batch position in the intake-to-storage pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Registered,
    TestPending,
    Tested,
    Stored,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Registered => "registered",
            BatchStatus::TestPending => "test_pending",
            BatchStatus::Tested => "tested",
            BatchStatus::Stored => "stored",
        }
    }

    /// Statuses that count towards warehouse capacity
    pub fn occupies_warehouse(&self) -> bool {
        matches!(
            self,
            BatchStatus::TestPending | BatchStatus::Tested | BatchStatus::Stored
        )
    }
}

/// One harvested lot, from intake through sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: Uuid,
    pub product_id: String,
    pub farmer_id: Uuid,
    pub harvest_date: NaiveDate,
    pub quantity_kg: Decimal,
    /// Unset until the quality lab grades the batch
    pub grade: Option<QualityGrade>,
    pub status: BatchStatus,
    pub warehouse_id: Option<Uuid>,
    /// Remaining crates; decreases as orders are fulfilled. Kept for
    /// capacity statistics; availability is derived from crate status.
    pub crate_count: u32,
    /// Point-in-time pricing snapshot attached at grading
    pub pricing: Option<BatchPricing>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
