use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use volarix_core::{BarWindow, Direction, Level, LevelKind, RejectionPattern};

/// How many trailing bars (including the decision bar) are searched.
const TAIL_LEN: usize = 5;
/// Maximum distance between a bar extreme and a level, in pips.
const MAX_DISTANCE_PIPS: Decimal = dec!(10);
/// Minimum wick-to-body ratio for a pin bar.
const WICK_BODY_RATIO: Decimal = dec!(1.5);
/// Floor on body size to avoid dividing by (near-)zero.
const BODY_EPSILON: Decimal = dec!(0.0000001);

/// Searches the tail of the window for a pin-bar rejection against the
/// surviving levels. Levels should already be sorted by descending score
/// by the caller (the pipeline); this function walks bars newest-first
/// and levels in the order given, so the first match encountered is the
/// tie-break winner by construction.
pub fn detect(window: &BarWindow, levels: &[Level]) -> Option<RejectionPattern> {
    let bars = window.bars();
    let decision_index = window.decision_index();
    let pip = window.pip_value();
    let tail_start = decision_index.saturating_sub(TAIL_LEN - 1);

    for bar_index in (tail_start..=decision_index).rev() {
        let bar = &bars[bar_index];
        let range = bar.range();
        if range.is_zero() {
            continue;
        }

        let body = bar.body().max(BODY_EPSILON);
        let upper_wick = bar.upper_wick();
        let lower_wick = bar.lower_wick();
        let close_position = match bar.close_position() {
            Some(p) => p,
            None => continue,
        };

        for level in levels {
            match level.kind {
                LevelKind::Support => {
                    let distance = (bar.low - level.price).abs();
                    let ratio = lower_wick / body;
                    if distance <= MAX_DISTANCE_PIPS * pip
                        && ratio > WICK_BODY_RATIO
                        && lower_wick > upper_wick
                        && close_position >= 0.60
                    {
                        let wick_body_ratio = ratio.to_f64().unwrap_or(0.0);
                        return Some(RejectionPattern {
                            bar_index,
                            direction: Direction::Buy,
                            level: level.clone(),
                            wick_body_ratio,
                            close_position,
                            confidence: confidence(level.score, wick_body_ratio),
                        });
                    }
                }
                LevelKind::Resistance => {
                    let distance = (bar.high - level.price).abs();
                    let ratio = upper_wick / body;
                    if distance <= MAX_DISTANCE_PIPS * pip
                        && ratio > WICK_BODY_RATIO
                        && upper_wick > lower_wick
                        && close_position <= 0.40
                    {
                        let wick_body_ratio = ratio.to_f64().unwrap_or(0.0);
                        return Some(RejectionPattern {
                            bar_index,
                            direction: Direction::Sell,
                            level: level.clone(),
                            wick_body_ratio,
                            close_position,
                            confidence: confidence(level.score, wick_body_ratio),
                        });
                    }
                }
            }
        }
    }

    None
}

/// `min(1.0, (score/100 + wick_body_ratio/10) / 2)`.
fn confidence(score: u8, wick_body_ratio: f64) -> f64 {
    ((f64::from(score) / 100.0 + wick_body_ratio / 10.0) / 2.0).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use volarix_core::{Bar, Timeframe};

    fn flat_bars(n: usize, base: Decimal) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| Bar {
                time: start + Duration::hours(i as i64),
                open: base,
                high: base + dec!(0.0005),
                low: base - dec!(0.0005),
                close: base,
                volume: 100,
            })
            .collect()
    }

    #[test]
    fn detects_support_bounce_pin_bar() {
        let mut bars = flat_bars(210, dec!(1.0850));
        let last = bars.len() - 1;
        bars[last].open = dec!(1.08520);
        bars[last].high = dec!(1.08545);
        bars[last].low = dec!(1.08455);
        bars[last].close = dec!(1.08530);
        let window = BarWindow::new("EURUSD", Timeframe::H1, bars).unwrap();

        let level = Level {
            price: dec!(1.08460),
            kind: LevelKind::Support,
            score: 85,
            last_touch_index: last - 30,
            touches: 3,
        };

        let pattern = detect(&window, &[level]).expect("expected a rejection pattern");
        assert_eq!(pattern.direction, Direction::Buy);
        assert_eq!(pattern.bar_index, last);
        // body=0.00010, lower_wick=0.00065 -> ratio=6.5; confidence=(0.85+0.65)/2=0.75
        assert!((pattern.confidence - 0.75).abs() < 0.01);
    }

    #[test]
    fn no_pattern_against_empty_levels() {
        let bars = flat_bars(210, dec!(1.0850));
        let window = BarWindow::new("EURUSD", Timeframe::H1, bars).unwrap();
        assert!(detect(&window, &[]).is_none());
    }
}
