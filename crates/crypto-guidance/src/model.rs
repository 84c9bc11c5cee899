//! Domain Models
//!
//! Market snapshots, historical series, and the guidance record produced per asset.
//! Uses `rust_decimal` for all prices and ratios - never use f64 for money!

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Deserializer, Serialize};

/// Point-in-time market state for one asset.
///
/// Field names follow the provider's `coins/markets` payload. Numeric fields are
/// optional because the provider nulls them for thinly tracked assets.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetSnapshot {
    /// Provider identifier (e.g., "bitcoin"), the join key for everything derived
    pub id: String,

    /// Ticker symbol (e.g., "btc")
    #[serde(default)]
    pub symbol: String,

    /// Display name (e.g., "Bitcoin")
    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "lenient_decimal")]
    pub current_price: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient_decimal")]
    pub market_cap: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient_decimal")]
    pub fully_diluted_valuation: Option<Decimal>,

    #[serde(rename = "total_volume", default, deserialize_with = "lenient_decimal")]
    pub total_volume_24h: Option<Decimal>,

    #[serde(rename = "price_change_percentage_24h", default, deserialize_with = "lenient_decimal")]
    pub price_change_pct_24h: Option<Decimal>,

    #[serde(
        rename = "price_change_percentage_7d_in_currency",
        default,
        deserialize_with = "lenient_decimal"
    )]
    pub price_change_pct_7d: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient_decimal")]
    pub high_24h: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient_decimal")]
    pub low_24h: Option<Decimal>,

    #[serde(rename = "ath", default, deserialize_with = "lenient_decimal")]
    pub ath_price: Option<Decimal>,

    #[serde(rename = "ath_change_percentage", default, deserialize_with = "lenient_decimal")]
    pub ath_change_pct: Option<Decimal>,

    #[serde(rename = "atl", default, deserialize_with = "lenient_decimal")]
    pub atl_price: Option<Decimal>,

    #[serde(rename = "atl_change_percentage", default, deserialize_with = "lenient_decimal")]
    pub atl_change_pct: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient_decimal")]
    pub circulating_supply: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_supply: Option<Decimal>,
}

impl AssetSnapshot {
    pub fn new(id: impl Into<String>, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.current_price = Some(price);
        self
    }

    pub fn with_market_cap(mut self, market_cap: Decimal) -> Self {
        self.market_cap = Some(market_cap);
        self
    }

    pub fn with_fdv(mut self, fdv: Decimal) -> Self {
        self.fully_diluted_valuation = Some(fdv);
        self
    }

    pub fn with_volume(mut self, volume_24h: Decimal) -> Self {
        self.total_volume_24h = Some(volume_24h);
        self
    }

    pub fn with_changes(mut self, change_24h: Decimal, change_7d: Option<Decimal>) -> Self {
        self.price_change_pct_24h = Some(change_24h);
        self.price_change_pct_7d = change_7d;
        self
    }
}

/// Accepts JSON numbers, decimal strings, or null. Values a `Decimal` cannot hold
/// become `None` instead of failing the whole batch.
fn lenient_decimal<'de, D>(deserializer: D) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Decimal::from_f64(n),
        Some(Raw::Text(s)) => Decimal::from_str(&s)
            .or_else(|_| Decimal::from_scientific(&s))
            .ok(),
        None => None,
    })
}

/// One daily price sample
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}

/// Price history for one asset, ascending by time
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    points: Vec<PricePoint>,
}

impl HistoricalSeries {
    /// Build a series, ordering samples ascending by timestamp
    pub fn from_points(mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Valuation ratios derived from a snapshot
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ratios {
    /// Fully diluted valuation / market cap
    pub fdv_ratio: Option<Decimal>,

    /// 24h volume / market cap
    pub volume_to_market_cap_ratio: Option<Decimal>,
}

/// Medium-horizon trend derived from a historical series
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    /// Percentage change from first to last sample (0 when indeterminate)
    pub trend_pct: Decimal,

    /// Lowest price over the trailing lookback window
    pub support: Option<Decimal>,

    /// Highest price over the trailing lookback window
    pub resistance: Option<Decimal>,
}

impl Trend {
    /// Neutral result used when history is missing or too short
    pub const fn indeterminate() -> Self {
        Self {
            trend_pct: Decimal::ZERO,
            support: None,
            resistance: None,
        }
    }
}

/// Discrete assessment label, ordered by severity (weakest first)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Assessment {
    GoAhead,
    MediumRisk,
    HighRisk,
    NoGo,
    StrongNoGo,
}

impl Assessment {
    pub const fn label(self) -> &'static str {
        match self {
            Self::GoAhead => "GO AHEAD",
            Self::MediumRisk => "MEDIUM RISK",
            Self::HighRisk => "HIGH RISK",
            Self::NoGo => "NO-GO",
            Self::StrongNoGo => "STRONG NO-GO",
        }
    }

    pub const fn tone(self) -> Tone {
        match self {
            Self::GoAhead => Tone::Go,
            Self::MediumRisk | Self::HighRisk => Tone::Caution,
            Self::NoGo | Self::StrongNoGo => Tone::NoGo,
        }
    }
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Display tone for an assessment (green / amber / red)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tone {
    Go,
    Caution,
    NoGo,
}

/// Short-horizon trading signal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSignal {
    Buy,
    Sell,
    Hold,
}

/// Six-month trend classification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outlook {
    Bullish,
    Bearish,
    Neutral,
}

/// Recommended share of a portfolio for one asset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionSize {
    #[serde(rename = "10-15%")]
    Core,
    #[serde(rename = "5-8%")]
    Standard,
    #[serde(rename = "2-3%")]
    Small,
    #[serde(rename = "0.5-1%")]
    Minimal,
    #[serde(rename = "AVOID")]
    Avoid,
}

impl PositionSize {
    /// Band for a (position-adjusted) risk score
    pub const fn for_score(score: u8) -> Self {
        match score {
            0..=2 => Self::Core,
            3..=4 => Self::Standard,
            5..=6 => Self::Small,
            7..=8 => Self::Minimal,
            _ => Self::Avoid,
        }
    }

    pub const fn band(self) -> &'static str {
        match self {
            Self::Core => "10-15%",
            Self::Standard => "5-8%",
            Self::Small => "2-3%",
            Self::Minimal => "0.5-1%",
            Self::Avoid => "AVOID",
        }
    }
}

impl fmt::Display for PositionSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.band())
    }
}

/// Full guidance output for one asset
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceRecord {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: Option<Decimal>,

    #[serde(flatten)]
    pub ratios: Ratios,

    /// Risk score, 1 (lowest) to 10 (highest)
    pub risk_score: u8,
    pub assessment: Assessment,
    pub tone: Tone,

    /// Triggered rule descriptions in evaluation order
    pub reasons: Vec<String>,

    pub position_size_recommendation: PositionSize,

    pub day_trade_signal: TradeSignal,
    /// Signal confidence, 0 to 100
    pub signal_strength: u8,
    pub signal_reason: String,

    pub six_month_outlook: Outlook,
    pub six_month_trend_pct: Decimal,
    pub support_level: Option<Decimal>,
    pub resistance_level: Option<Decimal>,

    /// Whether a usable price history backed the trend fields
    pub history_available: bool,
}

impl GuidanceRecord {
    /// Reasons joined for single-line display
    pub fn reason_summary(&self) -> String {
        self.reasons.join(". ")
    }
}
