//! Guidance Tracker
//!
//! Owns the watchlist and the last good record set. Every successful
//! add/remove runs a new orchestration cycle. Starting a cycle cancels any
//! cycle still in flight, and results from an overtaken cycle are never applied.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{watch, RwLock};
use tracing::{info, warn};

use crate::error::Result;
use crate::model::GuidanceRecord;
use crate::orchestrator::Orchestrator;
use crate::watchlist::Watchlist;

#[derive(Debug, Default)]
struct TrackerState {
    watchlist: Watchlist,
    records: HashMap<String, GuidanceRecord>,
    last_updated: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

/// What a tracker operation did
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerUpdate {
    /// Cycle run for this operation, if any
    pub cycle: Option<u64>,

    /// Whether the cycle's records replaced the retained ones
    pub applied: bool,

    /// Records written by the cycle
    pub records_updated: usize,

    pub pruned_ids: BTreeSet<String>,

    pub warnings: Vec<String>,
}

impl TrackerUpdate {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            warnings: vec![message.into()],
            ..Default::default()
        }
    }

    fn stale(cycle: u64) -> Self {
        Self {
            cycle: Some(cycle),
            ..Default::default()
        }
    }
}

/// Read-only view of the tracker for presentation
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSnapshot {
    pub watchlist: Vec<String>,
    pub records: HashMap<String, GuidanceRecord>,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

pub struct GuidanceTracker {
    orchestrator: Orchestrator,
    state: RwLock<TrackerState>,
    /// Id of the newest cycle started
    latest_cycle: watch::Sender<u64>,
}

impl GuidanceTracker {
    pub fn new(orchestrator: Orchestrator, watchlist: Watchlist) -> Self {
        Self {
            orchestrator,
            state: RwLock::new(TrackerState {
                watchlist,
                ..Default::default()
            }),
            latest_cycle: watch::Sender::new(0),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.orchestrator.provider_name()
    }

    /// Add an id and refresh. Blank or duplicate ids are a warning, not a cycle.
    pub async fn add(&self, raw: &str) -> Result<TrackerUpdate> {
        let added = self.state.write().await.watchlist.add(raw);
        match added {
            Ok(id) => {
                info!(%id, "added to watchlist");
                self.refresh().await
            }
            Err(warning) => Ok(TrackerUpdate::warning(warning.to_string())),
        }
    }

    /// Remove an id and its record immediately, then refresh
    pub async fn remove(&self, raw: &str) -> Result<TrackerUpdate> {
        let removed = {
            let mut state = self.state.write().await;
            let removed = state.watchlist.remove(raw);
            if let Ok(id) = &removed {
                state.records.remove(id);
            }
            removed
        };

        match removed {
            Ok(id) => {
                info!(%id, "removed from watchlist");
                self.refresh().await
            }
            Err(warning) => Ok(TrackerUpdate::warning(warning.to_string())),
        }
    }

    /// Run a cycle over the current watchlist.
    ///
    /// A fatal snapshot failure leaves the retained records untouched, records
    /// the error for display, and is returned as `Err`.
    pub async fn refresh(&self) -> Result<TrackerUpdate> {
        let mut cycle = 0;
        self.latest_cycle.send_modify(|latest| {
            *latest += 1;
            cycle = *latest;
        });
        let newer = self.latest_cycle.subscribe();
        let watchlist = self.state.read().await.watchlist.ids().clone();

        let result = tokio::select! {
            result = self.orchestrator.refresh(&watchlist) => result,
            () = superseded(newer, cycle) => {
                warn!(cycle, "cancelled cycle superseded by a newer one");
                return Ok(TrackerUpdate::stale(cycle));
            }
        };

        let mut state = self.state.write().await;
        let latest = *self.latest_cycle.borrow();
        if cycle != latest {
            warn!(cycle, latest, "discarding results from superseded cycle");
            return Ok(TrackerUpdate::stale(cycle));
        }

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                state.last_error = Some(e.user_message());
                return Err(e);
            }
        };

        let TrackerState {
            watchlist,
            records,
            last_updated,
            last_error,
        } = &mut *state;

        watchlist.prune(&outcome.pruned_ids);
        let records_updated = outcome.records.len();
        records.extend(outcome.records);
        records.retain(|id, _| watchlist.contains(id));
        *last_updated = outcome.completed_at;
        *last_error = None;

        Ok(TrackerUpdate {
            cycle: Some(cycle),
            applied: true,
            records_updated,
            pruned_ids: outcome.pruned_ids,
            warnings: outcome.warnings,
        })
    }

    pub async fn watchlist(&self) -> Vec<String> {
        self.state.read().await.watchlist.ids().iter().cloned().collect()
    }

    pub async fn records(&self) -> HashMap<String, GuidanceRecord> {
        self.state.read().await.records.clone()
    }

    pub async fn snapshot(&self) -> TrackerSnapshot {
        let state = self.state.read().await;
        TrackerSnapshot {
            watchlist: state.watchlist.ids().iter().cloned().collect(),
            records: state.records.clone(),
            last_updated: state.last_updated,
            last_error: state.last_error.clone(),
        }
    }
}

/// Resolves once a cycle newer than `cycle` has started
async fn superseded(mut latest: watch::Receiver<u64>, cycle: u64) {
    if latest.wait_for(|latest| *latest > cycle).await.is_err() {
        std::future::pending::<()>().await;
    }
}
