//! Risk & Signal Assessment Engine
//!
//! Stateless mapping from one asset's snapshot, ratios, and trend to its
//! [`GuidanceRecord`]. No I/O and no failure path: missing inputs mean the
//! rule that needs them does not apply.

use tracing::debug;

use super::risk::{self, position_adjusted_score};
use super::signal::{self, Momentum};
use crate::model::{AssetSnapshot, GuidanceRecord, Ratios, Trend};

pub fn assess(snapshot: &AssetSnapshot, ratios: &Ratios, trend: &Trend) -> GuidanceRecord {
    let profile = risk::evaluate(snapshot, ratios);
    let call = signal::trade_signal(&Momentum::from_snapshot(snapshot));
    let outlook = signal::outlook(trend.trend_pct);

    let adjusted = position_adjusted_score(profile.score, call.signal, outlook);
    let position_size = risk::position_size(adjusted);

    debug!(
        id = %snapshot.id,
        score = profile.score,
        adjusted,
        assessment = %profile.assessment,
        signal = ?call.signal,
        outlook = ?outlook,
        "assessed asset"
    );

    GuidanceRecord {
        id: snapshot.id.clone(),
        symbol: snapshot.symbol.to_uppercase(),
        name: snapshot.name.clone(),
        current_price: snapshot.current_price,
        ratios: *ratios,
        risk_score: profile.score,
        assessment: profile.assessment,
        tone: profile.assessment.tone(),
        reasons: profile.reasons,
        position_size_recommendation: position_size,
        day_trade_signal: call.signal,
        signal_strength: call.strength,
        signal_reason: call.reason.to_owned(),
        six_month_outlook: outlook,
        six_month_trend_pct: trend.trend_pct,
        support_level: trend.support,
        resistance_level: trend.resistance,
        history_available: trend.support.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::analysis::metrics::{self, DEFAULT_LOOKBACK_DAYS};
    use crate::market::daily_ramp;
    use crate::model::{Assessment, Outlook, PositionSize, Tone, TradeSignal};

    #[test]
    fn test_end_to_end_example() {
        let snapshot = AssetSnapshot::new("x", "x", "X")
            .with_market_cap(dec!(1000))
            .with_fdv(dec!(2200))
            .with_volume(dec!(3))
            .with_changes(dec!(25), Some(dec!(10)));
        let series = daily_ramp(40, dec!(100), dec!(120));

        let ratios = metrics::compute_ratios(&snapshot);
        let trend = metrics::compute_trend(Some(&series), DEFAULT_LOOKBACK_DAYS);
        let record = assess(&snapshot, &ratios, &trend);

        assert_eq!(ratios.fdv_ratio, Some(dec!(2.2)));
        assert_eq!(record.risk_score, 9);
        assert_eq!(record.assessment, Assessment::StrongNoGo);
        assert_eq!(record.tone, Tone::NoGo);
        assert_eq!(record.reasons.len(), 3);
        assert_eq!(record.day_trade_signal, TradeSignal::Buy);
        assert_eq!(record.signal_strength, 65);
        assert_eq!(record.six_month_outlook, Outlook::Bullish);
        assert_eq!(record.six_month_trend_pct, dec!(20));
        assert_eq!(record.position_size_recommendation, PositionSize::Minimal);
        assert!(record.history_available);
    }

    #[test]
    fn test_healthy_asset_without_history() {
        let snapshot = AssetSnapshot::new("bitcoin", "btc", "Bitcoin")
            .with_price(dec!(97500))
            .with_market_cap(dec!(1900000000000))
            .with_fdv(dec!(2000000000000))
            .with_volume(dec!(25000000000))
            .with_changes(dec!(1.2), Some(dec!(3)));

        let ratios = metrics::compute_ratios(&snapshot);
        let record = assess(&snapshot, &ratios, &Trend::indeterminate());

        assert_eq!(record.symbol, "BTC");
        assert_eq!(record.risk_score, 2);
        assert_eq!(record.assessment, Assessment::GoAhead);
        assert!(record.reasons.is_empty());
        assert_eq!(record.position_size_recommendation, PositionSize::Core);
        assert_eq!(record.day_trade_signal, TradeSignal::Hold);
        assert_eq!(record.six_month_outlook, Outlook::Neutral);
        assert_eq!(record.six_month_trend_pct, Decimal::ZERO);
        assert_eq!(record.support_level, None);
        assert!(!record.history_available);
    }

    #[test]
    fn test_reported_score_is_unadjusted() {
        // Sell signal + bearish outlook pushes sizing down a band, not the reported score
        let snapshot = AssetSnapshot::new("x", "x", "X")
            .with_market_cap(dec!(1000))
            .with_volume(dec!(8))
            .with_changes(dec!(-8), Some(dec!(-4)));
        let series = daily_ramp(40, dec!(100), dec!(70));

        let ratios = metrics::compute_ratios(&snapshot);
        let trend = metrics::compute_trend(Some(&series), DEFAULT_LOOKBACK_DAYS);
        let record = assess(&snapshot, &ratios, &trend);

        assert_eq!(record.risk_score, 6);
        assert_eq!(record.day_trade_signal, TradeSignal::Sell);
        assert_eq!(record.six_month_outlook, Outlook::Bearish);
        assert_eq!(record.position_size_recommendation, PositionSize::Minimal);
    }

    #[test]
    fn test_reason_summary() {
        let snapshot = AssetSnapshot::new("x", "x", "X")
            .with_market_cap(dec!(1000))
            .with_volume(dec!(1))
            .with_changes(dec!(30), None);
        let record = assess(&snapshot, &metrics::compute_ratios(&snapshot), &Trend::indeterminate());
        assert_eq!(
            record.reason_summary(),
            "Very low liquidity - difficult to trade. High 24h volatility"
        );
    }
}
