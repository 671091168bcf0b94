//! Configuration management for the FreshChain platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FSC_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Market price feed configuration
    pub market_feed: MarketFeedConfig,

    /// Freshness tunables
    pub freshness: FreshnessConfig,

    /// Warehouse defaults
    pub warehouse: WarehouseConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MarketFeedConfig {
    /// Location of the delimited price table
    pub url: String,

    /// Bound on the fetch; a timeout is treated as a fetch failure
    pub timeout_secs: u64,

    /// How long a fetched price table stays fresh
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FreshnessConfig {
    /// Remaining days at or below which stock is flagged Consume Soon
    pub consume_soon_threshold_days: i64,

    /// Fraction of consume-soon stock counted as waste prevented in the
    /// retail report
    pub waste_estimate_ratio: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WarehouseConfig {
    /// Capacity assigned to warehouses registered without an explicit one
    pub default_capacity_crates: u32,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("FSC_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("market_feed.url", "https://data.agmarket.example.com/prices.csv")?
            .set_default("market_feed.timeout_secs", 10)?
            .set_default("market_feed.cache_ttl_secs", 3600)?
            .set_default("freshness.consume_soon_threshold_days", 2)?
            .set_default("freshness.waste_estimate_ratio", 0.30)?
            .set_default("warehouse.default_capacity_crates", 100)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FSC_ prefix)
            .add_source(
                Environment::with_prefix("FSC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
