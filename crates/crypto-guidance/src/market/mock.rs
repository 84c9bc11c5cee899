//! Mock Market Data Provider
//!
//! For testing and demo purposes. Serves scripted snapshots and series and can
//! simulate unknown ids, failing fetches, and slow responses.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::MarketDataProvider;
use crate::error::{GuidanceError, Result};
use crate::model::{AssetSnapshot, HistoricalSeries, PricePoint};

/// Mock provider with scripted responses
#[derive(Debug, Default)]
pub struct MockMarketData {
    snapshots: Vec<AssetSnapshot>,
    series: HashMap<String, HistoricalSeries>,
    failing_history: HashSet<String>,
    history_delays: HashMap<String, Duration>,
    snapshot_delay: Option<Duration>,
    fail_snapshots: bool,
    snapshot_calls: AtomicUsize,
    history_calls: AtomicUsize,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offline data set covering the default watchlist
    pub fn demo() -> Self {
        // (id, symbol, name, price, market cap, fdv, volume, 24h %, 7d %, 180d start price)
        #[rustfmt::skip]
        let rows = [
            (
                "bitcoin", "btc", "Bitcoin",
                dec!(97500), dec!(1930000000000), dec!(2047000000000), dec!(25000000000),
                dec!(2.5), dec!(4.1), dec!(62000),
            ),
            (
                "ethereum", "eth", "Ethereum",
                dec!(3450), dec!(415000000000), dec!(415000000000), dec!(15000000000),
                dec!(1.8), dec!(-2.3), dec!(3300),
            ),
            (
                "binancecoin", "bnb", "BNB",
                dec!(690), dec!(100000000000), dec!(100000000000), dec!(1800000000),
                dec!(0.6), dec!(1.1), dec!(590),
            ),
            (
                "cardano", "ada", "Cardano",
                dec!(0.95), dec!(33500000000), dec!(42700000000), dec!(900000000),
                dec!(-1.2), dec!(-6.5), dec!(1.25),
            ),
            (
                "solana", "sol", "Solana",
                dec!(195), dec!(93000000000), dec!(115000000000), dec!(3000000000),
                dec!(6.2), dec!(9.4), dec!(140),
            ),
        ];

        rows.into_iter().fold(
            Self::new(),
            |mock, (id, symbol, name, price, cap, fdv, volume, change_24h, change_7d, start)| {
                let snapshot = AssetSnapshot::new(id, symbol, name)
                    .with_price(price)
                    .with_market_cap(cap)
                    .with_fdv(fdv)
                    .with_volume(volume)
                    .with_changes(change_24h, Some(change_7d));
                mock.with_snapshot(snapshot)
                    .with_series(id, daily_ramp(180, start, price))
            },
        )
    }

    pub fn with_snapshot(mut self, snapshot: AssetSnapshot) -> Self {
        self.snapshots.push(snapshot);
        self
    }

    pub fn with_series(mut self, id: impl Into<String>, series: HistoricalSeries) -> Self {
        self.series.insert(id.into(), series);
        self
    }

    /// Make the history fetch for `id` return an error
    pub fn with_failing_history(mut self, id: impl Into<String>) -> Self {
        self.failing_history.insert(id.into());
        self
    }

    /// Delay the history fetch for `id`
    pub fn with_history_delay(mut self, id: impl Into<String>, delay: Duration) -> Self {
        self.history_delays.insert(id.into(), delay);
        self
    }

    /// Delay every snapshot fetch
    pub fn with_snapshot_delay(mut self, delay: Duration) -> Self {
        self.snapshot_delay = Some(delay);
        self
    }

    /// Make every snapshot fetch fail
    pub fn with_failing_snapshots(mut self) -> Self {
        self.fail_snapshots = true;
        self
    }

    pub fn snapshot_calls(&self) -> usize {
        self.snapshot_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }
}

/// Daily series of `days` samples moving linearly from `start` to `end`, ending now
pub fn daily_ramp(days: usize, start: Decimal, end: Decimal) -> HistoricalSeries {
    let now = Utc::now();
    let steps = Decimal::from(days.saturating_sub(1).max(1));
    let points = (0..days)
        .map(|i| PricePoint {
            timestamp: now - ChronoDuration::days(i64::try_from(days - 1 - i).unwrap_or(i64::MAX)),
            price: start + (end - start) * Decimal::from(i) / steps,
        })
        .collect();
    HistoricalSeries::from_points(points)
}

#[async_trait]
impl MarketDataProvider for MockMarketData {
    async fn snapshots(&self, ids: &[String]) -> Result<Vec<AssetSnapshot>> {
        self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.snapshot_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_snapshots {
            return Err(GuidanceError::Http {
                status: 503,
                message: "mock snapshot outage".into(),
            });
        }

        Ok(self
            .snapshots
            .iter()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect())
    }

    async fn history(&self, id: &str, _days: u32) -> Result<HistoricalSeries> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.history_delays.get(id) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_history.contains(id) {
            return Err(GuidanceError::Provider(format!("mock history failure for {id}")));
        }

        self.series
            .get(id)
            .cloned()
            .ok_or_else(|| GuidanceError::UnknownAsset(id.to_string()))
    }

    fn name(&self) -> &str {
        "MockMarketData"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_ids_are_omitted() {
        let mock = MockMarketData::demo();
        let ids = vec!["bitcoin".to_string(), "not-a-real-id".to_string()];

        let snapshots = mock.snapshots(&ids).await.unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].id, "bitcoin");
        assert_eq!(mock.snapshot_calls(), 1);
    }

    #[tokio::test]
    async fn test_demo_history() {
        let mock = MockMarketData::demo();
        let series = mock.history("solana", 180).await.unwrap();
        assert_eq!(series.len(), 180);
        assert_eq!(series.points().last().map(|p| p.price), Some(dec!(195)));
    }

    #[tokio::test]
    async fn test_failing_history() {
        let mock = MockMarketData::demo().with_failing_history("ethereum");
        assert!(mock.history("ethereum", 180).await.is_err());
        assert!(mock.history("cardano", 180).await.is_ok());
    }
}
