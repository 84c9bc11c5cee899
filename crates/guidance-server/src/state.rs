//! Application State

use std::sync::Arc;

use crypto_guidance::GuidanceTracker;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Watchlist, retained guidance, and the orchestrator behind them
    pub tracker: Arc<GuidanceTracker>,
}
