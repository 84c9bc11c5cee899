//! Trading Signal & Outlook
//!
//! Short-horizon signal from an approximate momentum oscillator, and the
//! six-month outlook from the historical trend.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::model::{AssetSnapshot, Outlook, TradeSignal};

/// Momentum inputs for the signal rules
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Momentum {
    pub change_24h: Decimal,
    pub change_7d: Option<Decimal>,
    /// `50 + change_24h / 2`, a rough stand-in for RSI
    pub rsi_approx: Decimal,
}

impl Momentum {
    pub fn from_snapshot(snapshot: &AssetSnapshot) -> Self {
        let change_24h = snapshot.price_change_pct_24h.unwrap_or_default();
        Self {
            change_24h,
            change_7d: snapshot.price_change_pct_7d,
            rsi_approx: dec!(50) + change_24h / dec!(2),
        }
    }

    fn week_up(&self) -> bool {
        self.change_7d.is_some_and(|c| c > Decimal::ZERO)
    }

    fn week_down(&self) -> bool {
        self.change_7d.is_some_and(|c| c < Decimal::ZERO)
    }
}

/// Signal produced by the first matching rule
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalCall {
    pub signal: TradeSignal,
    pub strength: u8,
    pub reason: &'static str,
}

struct SignalRule {
    applies: fn(&Momentum) -> bool,
    signal: TradeSignal,
    strength: u8,
    reason: &'static str,
}

/// Evaluated top to bottom; the first rule that applies wins.
const SIGNAL_RULES: [SignalRule; 4] = [
    SignalRule {
        applies: |m| m.rsi_approx < dec!(30) && m.change_24h > dec!(2),
        signal: TradeSignal::Buy,
        strength: 80,
        reason: "Oversold with positive momentum",
    },
    SignalRule {
        applies: |m| m.rsi_approx > dec!(70) && m.change_24h < dec!(-2),
        signal: TradeSignal::Sell,
        strength: 80,
        reason: "Overbought with negative momentum",
    },
    SignalRule {
        applies: |m| m.change_24h > dec!(5) && m.week_up(),
        signal: TradeSignal::Buy,
        strength: 65,
        reason: "Strong upward momentum",
    },
    SignalRule {
        applies: |m| m.change_24h < dec!(-5) && m.week_down(),
        signal: TradeSignal::Sell,
        strength: 65,
        reason: "Strong downward momentum",
    },
];

const NO_SIGNAL: SignalCall = SignalCall {
    signal: TradeSignal::Hold,
    strength: 30,
    reason: "No clear signal",
};

pub fn trade_signal(momentum: &Momentum) -> SignalCall {
    SIGNAL_RULES
        .iter()
        .find(|rule| (rule.applies)(momentum))
        .map_or(NO_SIGNAL, |rule| SignalCall {
            signal: rule.signal,
            strength: rule.strength,
            reason: rule.reason,
        })
}

pub fn outlook(trend_pct: Decimal) -> Outlook {
    if trend_pct > dec!(15) {
        Outlook::Bullish
    } else if trend_pct < dec!(-15) {
        Outlook::Bearish
    } else {
        Outlook::Neutral
    }
}
