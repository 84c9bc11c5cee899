//! Analysis
//!
//! Metric derivation and the rule set that turns metrics into guidance.

pub mod metrics;
pub mod risk;
pub mod signal;
mod engine;

pub use engine::assess;
pub use metrics::{compute_ratios, compute_trend, DEFAULT_LOOKBACK_DAYS, MIN_TREND_SAMPLES};
pub use signal::{Momentum, SignalCall};
