//! FreshChain - Backend Server
//!
//! A farm-to-retail supply chain backend for perishable produce:
//! batch intake, quality grading, freshness-gated sale, warehouse crate
//! storage, FIFO order fulfillment, and market-derived pricing.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod clock;
mod config;
mod error;
mod external;
mod handlers;
mod locks;
mod routes;
mod services;
mod store;

pub use config::Config;

use clock::{Clock, SystemClock};
use external::HttpMarketFeed;
use locks::LockRegistry;
use services::{DispatchPlanner, PriceOracle, RoundRobinDispatcher};
use store::{KeyValueStore, MemoryStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KeyValueStore>,
    pub clock: Arc<dyn Clock>,
    pub locks: Arc<LockRegistry>,
    pub oracle: Arc<PriceOracle>,
    pub dispatch: Arc<dyn DispatchPlanner>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fsc_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting FreshChain Server");
    tracing::info!("Environment: {}", config.environment);

    // Wire up the collaborators
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let locks = Arc::new(LockRegistry::new());
    let feed = Arc::new(HttpMarketFeed::new(
        config.market_feed.url.clone(),
        Duration::from_secs(config.market_feed.timeout_secs),
    )?);
    let oracle = Arc::new(PriceOracle::new(
        feed,
        store.clone(),
        clock.clone(),
        Duration::from_secs(config.market_feed.cache_ttl_secs),
    ));
    let dispatch: Arc<dyn DispatchPlanner> = Arc::new(RoundRobinDispatcher::new());

    // Create application state
    let state = AppState {
        store,
        clock,
        locks,
        oracle,
        dispatch,
        config: Arc::new(config.clone()),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "FreshChain Supply Chain API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
