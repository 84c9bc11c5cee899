//! Watchlist State
//!
//! The set of asset ids under analysis. Ids are normalized (trimmed,
//! lowercased) on the way in.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ids analyzed when nothing else is configured
pub const DEFAULT_WATCHLIST: [&str; 5] = ["bitcoin", "ethereum", "binancecoin", "cardano", "solana"];

/// Why a watchlist change was not made
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchlistWarning {
    #[error("Please enter a crypto ID.")]
    EmptyId,

    #[error("{0} is already in your list.")]
    AlreadyPresent(String),

    #[error("{0} is not in your list.")]
    NotPresent(String),
}

/// Normalize a user-entered id; `None` if nothing is left after trimming
pub fn normalize_id(raw: &str) -> Option<String> {
    let id = raw.trim().to_lowercase();
    (!id.is_empty()).then_some(id)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watchlist {
    ids: BTreeSet<String>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        Self::from_ids(DEFAULT_WATCHLIST)
    }

    /// Build from raw ids, normalizing and dropping blanks
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            ids: ids.into_iter().filter_map(|id| normalize_id(id.as_ref())).collect(),
        }
    }

    /// Add an id, returning its normalized form
    pub fn add(&mut self, raw: &str) -> Result<String, WatchlistWarning> {
        let id = normalize_id(raw).ok_or(WatchlistWarning::EmptyId)?;
        if !self.ids.insert(id.clone()) {
            return Err(WatchlistWarning::AlreadyPresent(id));
        }
        Ok(id)
    }

    /// Remove an id, returning its normalized form
    pub fn remove(&mut self, raw: &str) -> Result<String, WatchlistWarning> {
        let id = normalize_id(raw).ok_or(WatchlistWarning::EmptyId)?;
        if !self.ids.remove(&id) {
            return Err(WatchlistWarning::NotPresent(id));
        }
        Ok(id)
    }

    /// Drop ids the provider does not recognize
    pub fn prune(&mut self, ids: &BTreeSet<String>) {
        self.ids.retain(|id| !ids.contains(id));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> &BTreeSet<String> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
