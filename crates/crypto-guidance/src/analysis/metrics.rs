//! Metric Deriver
//!
//! Pure functions turning raw snapshot fields and price history into ratios
//! and trend quantities.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::model::{AssetSnapshot, HistoricalSeries, Ratios, Trend};

/// Series must hold strictly more samples than this to yield a trend
pub const MIN_TREND_SAMPLES: usize = 30;

/// Default trailing window for support/resistance
pub const DEFAULT_LOOKBACK_DAYS: usize = 30;

/// Compute FDV and liquidity ratios. A ratio is `None` whenever either side is
/// missing or zero.
pub fn compute_ratios(snapshot: &AssetSnapshot) -> Ratios {
    Ratios {
        fdv_ratio: ratio(snapshot.fully_diluted_valuation, snapshot.market_cap),
        volume_to_market_cap_ratio: ratio(snapshot.total_volume_24h, snapshot.market_cap),
    }
}

fn ratio(numerator: Option<Decimal>, denominator: Option<Decimal>) -> Option<Decimal> {
    let numerator = numerator.filter(|n| !n.is_zero())?;
    let denominator = denominator.filter(|d| !d.is_zero())?;
    numerator.checked_div(denominator)
}

/// Compute the whole-series trend and the trailing support/resistance band.
///
/// Missing or short series (`<= MIN_TREND_SAMPLES` points) produce
/// [`Trend::indeterminate`].
pub fn compute_trend(series: Option<&HistoricalSeries>, lookback_days: usize) -> Trend {
    let Some(series) = series else {
        return Trend::indeterminate();
    };
    if series.len() <= MIN_TREND_SAMPLES {
        return Trend::indeterminate();
    }

    let points = series.points();
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Trend::indeterminate();
    };

    let Some(trend_pct) = (last.price - first.price)
        .checked_div(first.price)
        .and_then(|change| change.checked_mul(dec!(100)))
    else {
        return Trend::indeterminate();
    };

    let window = &points[points.len().saturating_sub(lookback_days)..];
    Trend {
        trend_pct,
        support: window.iter().map(|p| p.price).min(),
        resistance: window.iter().map(|p| p.price).max(),
    }
}
