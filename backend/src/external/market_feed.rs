//! Market price feed client
//!
//! Fetches the external commodity price table (a delimited document with
//! named columns) and parses it into price rows. Malformed rows degrade
//! gracefully: a bad row is dropped, never fatal for the table.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;

use shared::MarketPriceRow;

use crate::error::{AppError, AppResult};

/// "Fetch bytes, get text" collaborator for the external price table
#[async_trait]
pub trait MarketFeed: Send + Sync {
    async fn fetch_price_table(&self) -> AppResult<String>;
}

/// HTTP price feed client
pub struct HttpMarketFeed {
    client: Client,
    url: String,
}

impl HttpMarketFeed {
    /// Create a client with a bounded request timeout; a timeout is
    /// treated identically to a fetch failure
    pub fn new(url: String, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("http client: {}", e)))?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl MarketFeed for HttpMarketFeed {
    async fn fetch_price_table(&self) -> AppResult<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::SourceUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::SourceUnavailable(format!(
                "price source returned {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::SourceUnavailable(e.to_string()))
    }
}

/// Parse the delimited price table into rows
///
/// A row is dropped when commodity or market is missing or the modal
/// price is missing/non-numeric; min/max prices are optional. A missing
/// or non-numeric date serial defaults to 0, which simply never wins the
/// latest-row selection.
pub fn parse_price_table(text: &str) -> Vec<MarketPriceRow> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(h) => h.iter().map(normalize_header).collect(),
        Err(e) => {
            tracing::warn!("price table header unreadable: {}", e);
            return Vec::new();
        }
    };

    let column = |name: &str| headers.iter().position(|h| h == name);
    let (commodity_col, market_col, modal_col) = match (
        column("commodity"),
        column("market"),
        column("modal_price"),
    ) {
        (Some(c), Some(m), Some(p)) => (c, m, p),
        _ => {
            tracing::warn!("price table missing required columns");
            return Vec::new();
        }
    };
    let date_col = column("date");
    let min_col = column("min_price");
    let max_col = column("max_price");

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("price table row {} unreadable, dropped: {}", index, e);
                continue;
            }
        };

        let field = |col: Option<usize>| {
            col.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        let commodity = field(Some(commodity_col));
        let market = field(Some(market_col));
        let modal = field(Some(modal_col)).and_then(|s| s.parse::<Decimal>().ok());

        let (Some(commodity), Some(market), Some(modal_price)) = (commodity, market, modal)
        else {
            tracing::warn!("price table row {} incomplete, dropped", index);
            continue;
        };

        rows.push(MarketPriceRow {
            commodity: commodity.to_string(),
            market: market.to_string(),
            date_serial: field(date_col)
                .and_then(|s| s.parse::<i64>().ok())
                .unwrap_or(0),
            min_price: field(min_col).and_then(|s| s.parse::<Decimal>().ok()),
            modal_price,
            max_price: field(max_col).and_then(|s| s.parse::<Decimal>().ok()),
        });
    }

    rows
}

/// Lowercase and underscore-join a header name ("Modal Price" -> "modal_price")
fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_ascii_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
Commodity,Market,Date,Min Price,Modal Price,Max Price
Tomato,Central Market,45381,20,25,32
Tomato,Central Market,45382,22,27,30
Onion,North Market,45382,15,18,22
";

    #[test]
    fn parses_well_formed_rows() {
        let rows = parse_price_table(TABLE);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].commodity, "Tomato");
        assert_eq!(rows[0].market, "Central Market");
        assert_eq!(rows[0].date_serial, 45381);
        assert_eq!(rows[0].modal_price, Decimal::from(25));
        assert_eq!(rows[0].min_price, Some(Decimal::from(20)));
        assert_eq!(rows[0].max_price, Some(Decimal::from(32)));
    }

    #[test]
    fn drops_rows_with_missing_or_bad_modal_price() {
        let table = "\
Commodity,Market,Date,Min Price,Modal Price,Max Price
Tomato,Central Market,45381,20,,32
Tomato,Central Market,45382,20,abc,32
Onion,North Market,45382,15,18,22
";
        let rows = parse_price_table(table);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].commodity, "Onion");
    }

    #[test]
    fn min_and_max_prices_are_optional() {
        let table = "\
Commodity,Market,Date,Min Price,Modal Price,Max Price
Tomato,Central Market,45381,,25,
";
        let rows = parse_price_table(table);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].min_price, None);
        assert_eq!(rows[0].max_price, None);
    }

    #[test]
    fn one_bad_row_does_not_invalidate_the_table() {
        let table = "\
Commodity,Market,Date,Min Price,Modal Price,Max Price
,Central Market,45381,20,25,32
Tomato,,45381,20,25,32
Tomato,Central Market,45381,20,25,32
";
        let rows = parse_price_table(table);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn header_match_is_case_insensitive() {
        let table = "\
COMMODITY,market,DATE,min price,MODAL PRICE,Max price
Tomato,Central Market,45381,20,25,32
";
        let rows = parse_price_table(table);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn bad_date_serial_defaults_to_zero() {
        let table = "\
Commodity,Market,Date,Min Price,Modal Price,Max Price
Tomato,Central Market,notadate,20,25,32
";
        let rows = parse_price_table(table);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date_serial, 0);
    }
}
