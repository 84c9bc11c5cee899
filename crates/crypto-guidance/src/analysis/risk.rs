//! Risk Rules
//!
//! Dilution, liquidity, and volatility tiers plus position sizing.
//! Rules run in a fixed order and may only raise the score.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::model::{Assessment, AssetSnapshot, Outlook, PositionSize, Ratios, TradeSignal};

/// Score every asset starts from before any rule fires
pub const BASE_RISK_SCORE: u8 = 2;

pub const MIN_RISK_SCORE: u8 = 1;
pub const MAX_RISK_SCORE: u8 = 10;

/// Running result of the risk rules
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RiskProfile {
    pub score: u8,
    pub assessment: Assessment,
    pub reasons: Vec<String>,
}

impl Default for RiskProfile {
    fn default() -> Self {
        Self {
            score: BASE_RISK_SCORE,
            assessment: Assessment::GoAhead,
            reasons: Vec::new(),
        }
    }
}

impl RiskProfile {
    fn raise_score(&mut self, floor: u8) {
        self.score = self.score.max(floor);
    }

    /// Move the label up to `assessment` unless it is already more severe
    fn escalate(&mut self, assessment: Assessment) {
        self.assessment = self.assessment.max(assessment);
    }

    fn note(&mut self, reason: &str) {
        self.reasons.push(reason.to_owned());
    }
}

/// Run the dilution, liquidity, and volatility rules in order
pub fn evaluate(snapshot: &AssetSnapshot, ratios: &Ratios) -> RiskProfile {
    let mut profile = RiskProfile::default();
    apply_dilution(&mut profile, ratios.fdv_ratio);
    apply_liquidity(&mut profile, ratios.volume_to_market_cap_ratio);
    apply_volatility(&mut profile, snapshot.price_change_pct_24h);
    profile
}

fn apply_dilution(profile: &mut RiskProfile, fdv_ratio: Option<Decimal>) {
    let Some(fdv_ratio) = fdv_ratio else { return };

    if fdv_ratio > dec!(2.0) {
        profile.escalate(Assessment::StrongNoGo);
        profile.raise_score(9);
        profile.note("Extremely high FDV ratio - massive future dilution");
    } else if fdv_ratio > dec!(1.5) {
        profile.escalate(Assessment::HighRisk);
        profile.raise_score(7);
        profile.note("High FDV ratio - significant unlocks ahead");
    } else if fdv_ratio > dec!(1.2) {
        profile.escalate(Assessment::MediumRisk);
        profile.raise_score(5);
        profile.note("Moderate FDV ratio - review vesting schedule");
    }
}

fn apply_liquidity(profile: &mut RiskProfile, volume_ratio: Option<Decimal>) {
    let Some(volume_ratio) = volume_ratio else { return };

    if volume_ratio < dec!(0.005) {
        profile.escalate(Assessment::NoGo);
        profile.raise_score(8);
        profile.note("Very low liquidity - difficult to trade");
    } else if volume_ratio < dec!(0.01) {
        profile.escalate(Assessment::MediumRisk);
        profile.raise_score(6);
        profile.note("Low liquidity - caution on large orders");
    }
}

fn apply_volatility(profile: &mut RiskProfile, change_24h: Option<Decimal>) {
    if change_24h.is_some_and(|change| change.abs() > dec!(20)) {
        profile.raise_score(6);
        profile.note("High 24h volatility");
    }
}

/// Nudge the score by signal/outlook agreement, bounded to `[1, 10]`.
///
/// Only position sizing sees the adjusted score.
pub fn position_adjusted_score(score: u8, signal: TradeSignal, outlook: Outlook) -> u8 {
    let adjusted = match (signal, outlook) {
        (TradeSignal::Buy, Outlook::Bullish) => score.saturating_sub(1),
        (TradeSignal::Sell, Outlook::Bearish) => score.saturating_add(1),
        _ => score,
    };
    adjusted.clamp(MIN_RISK_SCORE, MAX_RISK_SCORE)
}

pub fn position_size(adjusted_score: u8) -> PositionSize {
    PositionSize::for_score(adjusted_score)
}
