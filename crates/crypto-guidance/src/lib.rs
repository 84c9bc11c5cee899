//! # crypto-guidance
//!
//! Liquidity and dilution risk scoring, position sizing, and short/medium
//! horizon signals for a watchlist of crypto assets.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  GuidanceTracker (watchlist + last good records)            │
//! │    add / remove ──► refresh                                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Orchestrator                                               │
//! │    snapshots(ids) ──► history(id) × N (concurrent)          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Analysis                                                   │
//! │    ratios + trend ──► risk tiers ──► signal ──► sizing      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example assessment
//!
//! ```text
//! FDV / market cap   2.2    ► STRONG NO-GO, score 9
//! volume / mcap      0.003  ► very low liquidity (label kept, score max(9, 8))
//! 24h change         +25%   ► high volatility (score max(9, 6))
//! 180d trend         +20%   ► BULLISH
//! momentum           +25% 24h, +10% 7d ► BUY (65)
//! BUY + BULLISH      score 9 → 8 for sizing ► 0.5-1%
//! ```

pub mod analysis;
pub mod error;
pub mod market;
pub mod model;
pub mod orchestrator;
pub mod tracker;
pub mod watchlist;

pub use error::{GuidanceError, Result};
pub use market::{CoinGeckoClient, MarketDataProvider, MockMarketData, ProviderConfig};
pub use model::{
    Assessment, AssetSnapshot, GuidanceRecord, HistoricalSeries, Outlook, PositionSize,
    PricePoint, Ratios, Tone, TradeSignal, Trend,
};
pub use orchestrator::{Orchestrator, OrchestratorConfig, RefreshOutcome};
pub use tracker::{GuidanceTracker, TrackerSnapshot, TrackerUpdate};
pub use watchlist::{Watchlist, WatchlistWarning, DEFAULT_WATCHLIST};
