//! Market price models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One (commodity, market, date) observation from the external price table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPriceRow {
    pub commodity: String,
    pub market: String,
    /// Integer date serial from the source table; larger is newer
    pub date_serial: i64,
    pub min_price: Option<Decimal>,
    pub modal_price: Decimal,
    pub max_price: Option<Decimal>,
}

/// Pricing snapshot attached to a graded batch
///
/// Computed once at grading time from the modal price and grade; never
/// recomputed afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPricing {
    pub market: String,
    pub commodity: String,
    pub modal_price: Decimal,
    pub farmer_payout_per_unit: i64,
    pub warehouse_price_per_unit: i64,
    pub retailer_price_per_unit: i64,
    pub price_date_serial: i64,
    pub computed_at: DateTime<Utc>,
}
