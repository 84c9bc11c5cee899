//! Data Aggregation Orchestrator
//!
//! One orchestration cycle: a single batch snapshot fetch, then one concurrent
//! history fetch per returned asset, then assessment of every asset.
//!
//! ```text
//! watchlist ──► snapshots(ids) ──┬─► history(a) ─┐
//!                                ├─► history(b) ─┼─► ratios + trend ─► assess ─► records
//!                                └─► history(c) ─┘
//! ```
//!
//! Only the snapshot fetch can fail a cycle. History failures, timeouts, and
//! short series degrade that asset to an indeterminate trend.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::analysis::{self, DEFAULT_LOOKBACK_DAYS, MIN_TREND_SAMPLES};
use crate::error::{GuidanceError, Result};
use crate::market::MarketDataProvider;
use crate::model::{GuidanceRecord, HistoricalSeries};

/// Orchestrator configuration
#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    /// History window requested per asset (days, daily samples)
    pub history_days: u32,

    /// Per-asset history fetch timeout in seconds
    pub fetch_timeout_secs: u64,

    /// Trailing window for support/resistance
    pub lookback_days: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            history_days: 180,
            fetch_timeout_secs: 20,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

impl OrchestratorConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            history_days: env_parse("HISTORY_DAYS").unwrap_or(defaults.history_days),
            fetch_timeout_secs: env_parse("FETCH_TIMEOUT_SECS").unwrap_or(defaults.fetch_timeout_secs),
            lookback_days: env_parse("TREND_LOOKBACK_DAYS")
                .filter(|days: &usize| *days > 0)
                .unwrap_or(defaults.lookback_days),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Result of one orchestration cycle
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOutcome {
    /// Guidance per asset id
    pub records: HashMap<String, GuidanceRecord>,

    /// Watchlist ids the provider did not recognize
    pub pruned_ids: BTreeSet<String>,

    /// Non-fatal problems, in the order they were found
    pub warnings: Vec<String>,

    pub completed_at: Option<DateTime<Utc>>,
}

/// Fetches, reconciles, and assesses a watchlist
pub struct Orchestrator {
    provider: Arc<dyn MarketDataProvider>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: OrchestratorConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Run one cycle over `watchlist`.
    ///
    /// Returns `Err` only when the snapshot fetch itself fails; no partial
    /// records are produced in that case.
    pub async fn refresh(&self, watchlist: &BTreeSet<String>) -> Result<RefreshOutcome> {
        if watchlist.is_empty() {
            return Ok(RefreshOutcome {
                completed_at: Some(Utc::now()),
                ..Default::default()
            });
        }

        let ids: Vec<String> = watchlist.iter().cloned().collect();
        let mut snapshots = self.provider.snapshots(&ids).await.inspect_err(|e| {
            error!(provider = self.provider.name(), error = %e, "snapshot fetch failed");
        })?;
        snapshots.retain(|s| watchlist.contains(&s.id));
        let mut seen = BTreeSet::new();
        snapshots.retain(|s| seen.insert(s.id.clone()));

        let mut outcome = RefreshOutcome {
            pruned_ids: watchlist.difference(&seen).cloned().collect(),
            ..Default::default()
        };
        if !outcome.pruned_ids.is_empty() {
            let missing: Vec<&str> = outcome.pruned_ids.iter().map(String::as_str).collect();
            warn!(ids = ?missing, "provider did not recognize ids");
            outcome
                .warnings
                .push(format!("Could not find data for: {}", missing.join(", ")));
        }

        let histories = join_all(snapshots.iter().map(|s| self.fetch_history(&s.id))).await;

        for (snapshot, history) in snapshots.iter().zip(histories) {
            let series = match history {
                Ok(series) if series.len() > MIN_TREND_SAMPLES => Some(series),
                Ok(series) => {
                    warn!(id = %snapshot.id, samples = series.len(), "price history too short for trend");
                    outcome.warnings.push(format!(
                        "Not enough price history for {} ({} samples)",
                        snapshot.id,
                        series.len()
                    ));
                    None
                }
                Err(e) => {
                    warn!(id = %snapshot.id, error = %e, "price history unavailable");
                    outcome
                        .warnings
                        .push(format!("Price history unavailable for {}: {e}", snapshot.id));
                    None
                }
            };

            let ratios = analysis::compute_ratios(snapshot);
            let trend = analysis::compute_trend(series.as_ref(), self.config.lookback_days);
            let record = analysis::assess(snapshot, &ratios, &trend);
            outcome.records.insert(snapshot.id.clone(), record);
        }

        outcome.completed_at = Some(Utc::now());
        info!(
            requested = watchlist.len(),
            assessed = outcome.records.len(),
            pruned = outcome.pruned_ids.len(),
            warnings = outcome.warnings.len(),
            "orchestration cycle complete"
        );
        Ok(outcome)
    }

    async fn fetch_history(&self, id: &str) -> Result<HistoricalSeries> {
        let secs = self.config.fetch_timeout_secs;
        tokio::time::timeout(
            Duration::from_secs(secs),
            self.provider.history(id, self.config.history_days),
        )
        .await
        .map_err(|_| GuidanceError::Timeout { id: id.to_string(), secs })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::market::{daily_ramp, MockMarketData};
    use crate::model::{AssetSnapshot, Outlook};

    fn ids(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    fn orchestrator(mock: MockMarketData) -> (Orchestrator, Arc<MockMarketData>) {
        let mock = Arc::new(mock);
        let config = OrchestratorConfig {
            fetch_timeout_secs: 1,
            ..Default::default()
        };
        (Orchestrator::new(mock.clone(), config), mock)
    }

    #[tokio::test]
    async fn test_empty_watchlist_makes_no_calls() {
        let (orchestrator, mock) = orchestrator(MockMarketData::demo());
        let outcome = orchestrator.refresh(&BTreeSet::new()).await.unwrap();

        assert!(outcome.records.is_empty());
        assert!(outcome.pruned_ids.is_empty());
        assert_eq!(mock.snapshot_calls(), 0);
        assert_eq!(mock.history_calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_pruned() {
        let (orchestrator, _) = orchestrator(MockMarketData::demo());
        let outcome = orchestrator
            .refresh(&ids(&["bitcoin", "not-a-real-id"]))
            .await
            .unwrap();

        assert_eq!(outcome.pruned_ids, ids(&["not-a-real-id"]));
        assert_eq!(outcome.records.len(), 1);
        assert!(outcome.records["bitcoin"].history_available);
        assert_eq!(outcome.warnings, vec!["Could not find data for: not-a-real-id".to_string()]);
    }

    #[tokio::test]
    async fn test_history_failure_degrades_one_asset() {
        let (orchestrator, mock) =
            orchestrator(MockMarketData::demo().with_failing_history("solana"));
        let watchlist = ids(&["bitcoin", "ethereum", "solana"]);
        let outcome = orchestrator.refresh(&watchlist).await.unwrap();

        assert_eq!(outcome.records.len(), 3);
        assert_eq!(mock.history_calls(), 3);

        let solana = &outcome.records["solana"];
        assert!(!solana.history_available);
        assert_eq!(solana.six_month_trend_pct, Decimal::ZERO);
        assert_eq!(solana.six_month_outlook, Outlook::Neutral);
        assert_eq!(solana.support_level, None);
        assert_eq!(solana.resistance_level, None);

        assert!(outcome.records["bitcoin"].history_available);
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_history_timeout_degrades_instead_of_aborting() {
        let (orchestrator, _) = orchestrator(
            MockMarketData::demo().with_history_delay("cardano", Duration::from_secs(5)),
        );
        let outcome = orchestrator
            .refresh(&ids(&["cardano", "bitcoin"]))
            .await
            .unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert!(!outcome.records["cardano"].history_available);
        assert!(outcome.warnings[0].contains("timed out"));
    }

    #[tokio::test]
    async fn test_short_history_is_indeterminate() {
        let snapshot = AssetSnapshot::new("tiny", "tny", "Tiny")
            .with_market_cap(dec!(1000))
            .with_volume(dec!(100))
            .with_changes(dec!(0), None);
        let mock = MockMarketData::new()
            .with_snapshot(snapshot)
            .with_series("tiny", daily_ramp(20, dec!(1), dec!(5)));
        let (orchestrator, _) = orchestrator(mock);

        let outcome = orchestrator.refresh(&ids(&["tiny"])).await.unwrap();
        let record = &outcome.records["tiny"];
        assert_eq!(record.six_month_trend_pct, Decimal::ZERO);
        assert!(!record.history_available);
        assert!(outcome.warnings[0].contains("20 samples"));
    }

    #[tokio::test]
    async fn test_snapshot_failure_is_fatal() {
        let (orchestrator, mock) =
            orchestrator(MockMarketData::demo().with_failing_snapshots());
        let result = orchestrator.refresh(&ids(&["bitcoin"])).await;

        assert!(matches!(result, Err(GuidanceError::Http { status: 503, .. })));
        assert_eq!(mock.history_calls(), 0);
    }
}
