//! crypto-guidance HTTP Server
//!
//! Axum-based server exposing the watchlist and its guidance records as JSON.
//! Rendering is left to whatever client consumes these endpoints.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crypto_guidance::{
    CoinGeckoClient, GuidanceTracker, MarketDataProvider, MockMarketData, Orchestrator,
    OrchestratorConfig, Watchlist,
};

use crate::handlers::{add_asset, guidance, health_check, list_watchlist, refresh, remove_asset};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Market data provider
    let provider: Arc<dyn MarketDataProvider> = match std::env::var("MARKET_DATA").as_deref() {
        Ok("mock") => {
            tracing::warn!("⚠ Using offline demo market data");
            Arc::new(MockMarketData::demo())
        }
        _ => Arc::new(CoinGeckoClient::from_env()?),
    };
    tracing::info!("✓ Market data provider: {}", provider.name());

    // Initial watchlist
    let watchlist = std::env::var("WATCHLIST")
        .map(|ids| Watchlist::from_ids(ids.split(',')))
        .unwrap_or_else(|_| Watchlist::with_defaults());
    tracing::info!("Watching {} assets", watchlist.len());

    let orchestrator = Orchestrator::new(provider, OrchestratorConfig::from_env());
    let tracker = Arc::new(GuidanceTracker::new(orchestrator, watchlist));

    // Populate records before serving
    match tracker.refresh().await {
        Ok(update) => {
            for warning in &update.warnings {
                tracing::warn!("  {}", warning);
            }
        }
        Err(e) => tracing::warn!("⚠ Initial refresh failed: {}", e),
    }

    let app = router(AppState { tracker });

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 guidance server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /health              - Health check");
    tracing::info!("  GET    /api/watchlist       - Watched asset ids");
    tracing::info!("  POST   /api/watchlist       - Add an asset id");
    tracing::info!("  DELETE /api/watchlist/{{id}}  - Remove an asset id");
    tracing::info!("  POST   /api/refresh         - Run a refresh cycle");
    tracing::info!("  GET    /api/guidance        - Guidance records");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/watchlist", get(list_watchlist).post(add_asset))
        .route("/api/watchlist/{id}", delete(remove_asset))
        .route("/api/refresh", post(refresh))
        .route("/api/guidance", get(guidance))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
