use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::TradeSetup;

/// Everything about an accepted (non-HOLD) decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDetails {
    pub setup: TradeSetup,
    pub confidence: f64,
    pub reason: String,
}

/// The pipeline's decision. A tagged union rather than a dynamically
/// shaped result: HOLD is a normal value here, never an exception or an
/// `Err`, and always carries the canonical reason string that explains it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision")]
pub enum Signal {
    Buy {
        #[serde(flatten)]
        details: SignalDetails,
    },
    Sell {
        #[serde(flatten)]
        details: SignalDetails,
    },
    Hold {
        reason: String,
    },
}

impl Signal {
    pub fn is_hold(&self) -> bool {
        matches!(self, Signal::Hold { .. })
    }

    pub fn confidence(&self) -> f64 {
        match self {
            Signal::Buy { details } | Signal::Sell { details } => details.confidence,
            Signal::Hold { .. } => 0.0,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Signal::Buy { details } | Signal::Sell { details } => &details.reason,
            Signal::Hold { reason } => reason,
        }
    }
}

/// Formats a price to the five-fractional-digit convention used in the
/// `reason` string, so every caller doesn't reinvent it.
pub fn format_price(price: rust_decimal::Decimal) -> String {
    format!("{:.5}", price)
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy { details } => write!(
                f,
                "BUY entry={} sl={} tp1={} tp2={} tp3={} confidence={:.2} ({})",
                format_price(details.setup.entry),
                format_price(details.setup.sl),
                format_price(details.setup.tp1),
                format_price(details.setup.tp2),
                format_price(details.setup.tp3),
                details.confidence,
                details.reason
            ),
            Signal::Sell { details } => write!(
                f,
                "SELL entry={} sl={} tp1={} tp2={} tp3={} confidence={:.2} ({})",
                format_price(details.setup.entry),
                format_price(details.setup.sl),
                format_price(details.setup.tp1),
                format_price(details.setup.tp2),
                format_price(details.setup.tp3),
                details.confidence,
                details.reason
            ),
            Signal::Hold { reason } => write!(f, "HOLD ({reason})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TradeSetup;
    use rust_decimal_macros::dec;

    #[test]
    fn hold_has_zero_confidence() {
        let s = Signal::Hold {
            reason: "No significant S/R levels detected".to_string(),
        };
        assert_eq!(s.confidence(), 0.0);
        assert!(s.is_hold());
    }

    #[test]
    fn hold_round_trips_through_json() {
        let s = Signal::Hold {
            reason: "No rejection pattern at valid S/R levels".to_string(),
        };
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"decision":"Hold","reason":"No rejection pattern at valid S/R levels"}"#);
        let round_tripped: Signal = serde_json::from_str(&json).unwrap();
        assert_eq!(round_tripped, s);
    }

    #[test]
    fn display_uses_five_fractional_digits() {
        let s = Signal::Buy {
            details: SignalDetails {
                setup: TradeSetup {
                    entry: dec!(1.08537),
                    sl: dec!(1.08490),
                    tp1: dec!(1.08584),
                    tp2: dec!(1.08631),
                    tp3: dec!(1.08678),
                    tp_fractions: TradeSetup::TP_FRACTIONS,
                },
                confidence: 0.67,
                reason: "Support bounce at 1.08500, score 85".to_string(),
            },
        };
        assert!(s.to_string().contains("1.08537"));
    }
}
