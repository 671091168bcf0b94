//! Price oracle: cached market price table and pricing snapshots
//!
//! The oracle keeps a single cached price table, in memory and in the
//! persistent store, refreshed from the external feed when the TTL
//! lapses. Availability beats freshness: a failed refresh falls back to
//! whichever cache is populated, however stale, and only ever returns an
//! empty table when nothing has been cached at all.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use shared::{
    commodity_for_product, compute_three_tier_pricing, BatchPricing, MarketPriceRow, QualityGrade,
    Warehouse,
};

use crate::clock::Clock;
use crate::error::AppResult;
use crate::external::{parse_price_table, MarketFeed};
use crate::store::{self, keys, KeyValueStore};

/// A fetched price table together with its fetch time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedPriceTable {
    pub rows: Vec<MarketPriceRow>,
    pub fetched_at: DateTime<Utc>,
}

/// Market price oracle
pub struct PriceOracle {
    feed: Arc<dyn MarketFeed>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    memory: RwLock<Option<CachedPriceTable>>,
    /// Held by at most one refresh at a time; readers never wait on it
    refresh: Mutex<()>,
}

impl PriceOracle {
    pub fn new(
        feed: Arc<dyn MarketFeed>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            feed,
            store,
            clock,
            ttl,
            memory: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    fn is_fresh(&self, table: &CachedPriceTable) -> bool {
        let age = self.clock.now() - table.fetched_at;
        age.to_std().map(|a| a < self.ttl).unwrap_or(false)
    }

    /// Current price table rows, cache-mediated
    pub async fn load_market_prices(&self) -> AppResult<Vec<MarketPriceRow>> {
        if let Some(table) = self.memory.read().await.as_ref() {
            if self.is_fresh(table) {
                return Ok(table.rows.clone());
            }
        }

        if let Some(table) =
            store::get_json::<CachedPriceTable>(self.store.as_ref(), keys::PRICE_CACHE).await?
        {
            if self.is_fresh(&table) {
                let rows = table.rows.clone();
                *self.memory.write().await = Some(table);
                return Ok(rows);
            }
        }

        self.refresh_or_fallback().await
    }

    /// Refresh from the feed if no refresh is in flight; otherwise (and on
    /// any fetch failure) serve the stalest thing we have
    async fn refresh_or_fallback(&self) -> AppResult<Vec<MarketPriceRow>> {
        let Ok(_guard) = self.refresh.try_lock() else {
            // another caller is refreshing; serve stale rather than wait
            return self.stale_fallback().await;
        };

        match self.feed.fetch_price_table().await {
            Ok(text) => {
                let rows = parse_price_table(&text);
                tracing::info!(rows = rows.len(), "market price table refreshed");
                let table = CachedPriceTable {
                    rows: rows.clone(),
                    fetched_at: self.clock.now(),
                };
                if let Err(e) =
                    store::put_json(self.store.as_ref(), keys::PRICE_CACHE, &table).await
                {
                    tracing::warn!("persisting price cache failed: {}", e);
                }
                *self.memory.write().await = Some(table);
                Ok(rows)
            }
            Err(e) => {
                tracing::warn!("market price fetch failed, falling back to cache: {}", e);
                self.stale_fallback().await
            }
        }
    }

    /// In-memory cache first, then persistent; empty only if neither has
    /// ever been populated
    async fn stale_fallback(&self) -> AppResult<Vec<MarketPriceRow>> {
        if let Some(table) = self.memory.read().await.as_ref() {
            return Ok(table.rows.clone());
        }
        if let Some(table) =
            store::get_json::<CachedPriceTable>(self.store.as_ref(), keys::PRICE_CACHE).await?
        {
            let rows = table.rows.clone();
            *self.memory.write().await = Some(table);
            return Ok(rows);
        }
        tracing::warn!("no market price data has ever been cached");
        Ok(Vec::new())
    }

    /// Best matching row for a (commodity, market) pair
    pub async fn latest_market_row(
        &self,
        commodity: &str,
        market: &str,
    ) -> AppResult<Option<MarketPriceRow>> {
        let rows = self.load_market_prices().await?;
        Ok(select_latest_row(&rows, commodity, market).cloned())
    }

    /// Latest row for a product's commodity in the warehouse's market;
    /// `None` when either mapping or the row is absent
    pub async fn modal_row_for_warehouse(
        &self,
        product_id: &str,
        warehouse_id: Uuid,
    ) -> AppResult<Option<MarketPriceRow>> {
        let Some(commodity) = commodity_for_product(product_id) else {
            return Ok(None);
        };
        let Some(warehouse) =
            store::get_json::<Warehouse>(self.store.as_ref(), &keys::warehouse(warehouse_id))
                .await?
        else {
            return Ok(None);
        };
        self.latest_market_row(commodity, &warehouse.market_name).await
    }

    /// Pricing snapshot for a graded batch, or `None` when no market row
    /// matches (the caller falls back to the static base price)
    pub async fn pricing_snapshot(
        &self,
        product_id: &str,
        warehouse_id: Option<Uuid>,
        grade: QualityGrade,
    ) -> AppResult<Option<BatchPricing>> {
        let Some(warehouse_id) = warehouse_id else {
            return Ok(None);
        };
        let Some(row) = self.modal_row_for_warehouse(product_id, warehouse_id).await? else {
            return Ok(None);
        };

        let tiers = compute_three_tier_pricing(row.modal_price, grade);
        Ok(Some(BatchPricing {
            market: row.market,
            commodity: row.commodity,
            modal_price: row.modal_price,
            farmer_payout_per_unit: tiers.farmer_payout,
            warehouse_price_per_unit: tiers.warehouse_price,
            retailer_price_per_unit: tiers.retailer_price,
            price_date_serial: row.date_serial,
            computed_at: self.clock.now(),
        }))
    }
}

/// Case-insensitive (commodity, market) match; the maximum date serial
/// wins and the first row seen at that serial is kept
pub fn select_latest_row<'a>(
    rows: &'a [MarketPriceRow],
    commodity: &str,
    market: &str,
) -> Option<&'a MarketPriceRow> {
    let mut best: Option<&MarketPriceRow> = None;
    for row in rows.iter().filter(|r| {
        r.commodity.eq_ignore_ascii_case(commodity) && r.market.eq_ignore_ascii_case(market)
    }) {
        if best.map_or(true, |b| row.date_serial > b.date_serial) {
            best = Some(row);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use crate::clock::FixedClock;
    use crate::error::AppError;
    use crate::store::MemoryStore;

    const TABLE: &str = "\
Commodity,Market,Date,Min Price,Modal Price,Max Price
Tomato,Central Market,45381,20,25,32
Tomato,Central Market,45382,22,27,30
tomato,CENTRAL MARKET,45380,19,24,31
Onion,North Market,45382,15,18,22
";

    struct ScriptedFeed {
        fetches: AtomicUsize,
        fail: bool,
    }

    impl ScriptedFeed {
        fn ok() -> Self {
            Self { fetches: AtomicUsize::new(0), fail: false }
        }

        fn failing() -> Self {
            Self { fetches: AtomicUsize::new(0), fail: true }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MarketFeed for ScriptedFeed {
        async fn fetch_price_table(&self) -> AppResult<String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AppError::SourceUnavailable("connection refused".to_string()))
            } else {
                Ok(TABLE.to_string())
            }
        }
    }

    fn oracle(feed: Arc<ScriptedFeed>, store: Arc<MemoryStore>) -> PriceOracle {
        let clock = Arc::new(FixedClock(Utc::now()));
        PriceOracle::new(feed, store, clock, Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let feed = Arc::new(ScriptedFeed::ok());
        let oracle = oracle(feed.clone(), Arc::new(MemoryStore::new()));

        let first = oracle.load_market_prices().await.unwrap();
        let second = oracle.load_market_prices().await.unwrap();
        assert_eq!(first.len(), 4);
        assert_eq!(first, second);
        assert_eq!(feed.fetch_count(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_with_no_cache_returns_empty_not_error() {
        let feed = Arc::new(ScriptedFeed::failing());
        let oracle = oracle(feed, Arc::new(MemoryStore::new()));

        let rows = oracle.load_market_prices().await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn persistent_cache_survives_a_restart() {
        let store = Arc::new(MemoryStore::new());
        let good = Arc::new(ScriptedFeed::ok());
        oracle(good, store.clone()).load_market_prices().await.unwrap();

        // new oracle, dead feed: rows come back from the persistent cache
        let bad = Arc::new(ScriptedFeed::failing());
        let revived = oracle(bad.clone(), store);
        let rows = revived.load_market_prices().await.unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(bad.fetch_count(), 0);
    }

    #[tokio::test]
    async fn stale_cache_beats_a_failed_refresh() {
        let store = Arc::new(MemoryStore::new());
        let good = Arc::new(ScriptedFeed::ok());
        let clock = Arc::new(FixedClock(Utc::now()));
        let warm = PriceOracle::new(good, store.clone(), clock.clone(), Duration::from_secs(3600));
        warm.load_market_prices().await.unwrap();

        // TTL of zero makes the cache immediately stale
        let bad = Arc::new(ScriptedFeed::failing());
        let stale = PriceOracle::new(bad.clone(), store, clock, Duration::from_secs(0));
        let rows = stale.load_market_prices().await.unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(bad.fetch_count(), 1);
    }

    #[tokio::test]
    async fn modal_lookup_returns_none_for_unknown_mappings() {
        let feed = Arc::new(ScriptedFeed::ok());
        let oracle = oracle(feed, Arc::new(MemoryStore::new()));

        // product missing from the catalog
        let row = oracle
            .modal_row_for_warehouse("durian", Uuid::new_v4())
            .await
            .unwrap();
        assert!(row.is_none());

        // known product, unregistered warehouse
        let row = oracle
            .modal_row_for_warehouse("tomato", Uuid::new_v4())
            .await
            .unwrap();
        assert!(row.is_none());
    }

    #[test]
    fn latest_row_matches_case_insensitively_and_by_max_date() {
        let rows = parse_price_table(TABLE);
        let row = select_latest_row(&rows, "TOMATO", "central market").unwrap();
        assert_eq!(row.date_serial, 45382);
        assert_eq!(row.modal_price, Decimal::from(27));
        assert!(select_latest_row(&rows, "Tomato", "North Market").is_none());
    }
}
