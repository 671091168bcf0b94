//! External service integrations

pub mod market_feed;

pub use market_feed::{parse_price_table, HttpMarketFeed, MarketFeed};
