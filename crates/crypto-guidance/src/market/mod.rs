//! Market Data Integration
//!
//! The provider seam the orchestrator fetches through, with a CoinGecko
//! implementation and an in-memory mock.

mod coingecko;
mod mock;

pub use coingecko::{CoinGeckoClient, ProviderConfig};
pub use mock::{daily_ramp, MockMarketData};

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{AssetSnapshot, HistoricalSeries};

/// Market data provider trait (Strategy pattern)
///
/// Implement this for each data source: CoinGecko, CoinMarketCap, an exchange, etc.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Current snapshots for a batch of ids.
    ///
    /// Ids the provider does not recognize are silently omitted from the result.
    async fn snapshots(&self, ids: &[String]) -> Result<Vec<AssetSnapshot>>;

    /// Daily price history for one id over the last `days` days, ascending by time
    async fn history(&self, id: &str, days: u32) -> Result<HistoricalSeries>;

    /// Provider name
    fn name(&self) -> &str;
}
