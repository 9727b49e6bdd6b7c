use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use volarix_core::{Level, LevelKind};

use volarix_core::BarWindow;

/// Bars of lookback preceding the decision bar, inclusive of its own tail.
pub const LOOKBACK: usize = 50;
/// Radius of the swing-point window.
const SWING_RADIUS: usize = 5;
/// Cluster tolerance, in pips.
const CLUSTER_PIPS: Decimal = dec!(10);
/// Bars-before-decision window for the "recent touch" score bonus.
const RECENT_TOUCH_WINDOW: usize = 20;
/// Minimum score a level must clear to survive.
const MIN_SCORE: u8 = 60;

/// The clustering tolerance in absolute price units for a given pip value;
/// also used by `volarix-state` when matching surviving levels against
/// remembered broken prices, which share the same `cluster_pips` constant.
pub fn cluster_tolerance(pip_value: Decimal) -> Decimal {
    CLUSTER_PIPS * pip_value
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    price: Decimal,
    kind: LevelKind,
}

/// Finds swing highs/lows in the lookback window and folds them into
/// scored, clustered [`Level`]s. Empty output means the pipeline holds
/// with "No significant S/R levels detected".
pub fn detect(window: &BarWindow) -> Vec<Level> {
    let bars = window.bars();
    let decision_index = window.decision_index();
    let pip = window.pip_value();

    let search_start = decision_index.saturating_sub(LOOKBACK);
    let search_end = decision_index; // exclusive upper bound: candidates strictly before decision bar

    let mut candidates = Vec::new();
    for i in search_start..search_end {
        if i < SWING_RADIUS || i + SWING_RADIUS >= bars.len() {
            continue;
        }
        let lo = i - SWING_RADIUS;
        let hi = i + SWING_RADIUS;

        let is_swing_high = bars[lo..i].iter().all(|b| bars[i].high > b.high)
            && bars[i + 1..=hi].iter().all(|b| bars[i].high > b.high);
        if is_swing_high {
            candidates.push(Candidate {
                index: i,
                price: bars[i].high,
                kind: LevelKind::Resistance,
            });
        }

        let is_swing_low = bars[lo..i].iter().all(|b| bars[i].low < b.low)
            && bars[i + 1..=hi].iter().all(|b| bars[i].low < b.low);
        if is_swing_low {
            candidates.push(Candidate {
                index: i,
                price: bars[i].low,
                kind: LevelKind::Support,
            });
        }
    }

    candidates.sort_by(|a, b| a.price.cmp(&b.price));

    let tolerance = CLUSTER_PIPS * pip;
    let clusters = cluster(&candidates, tolerance);

    let mut levels: Vec<Level> = clusters
        .into_iter()
        .map(|members| score_cluster(&members, bars, decision_index))
        .filter(|level| level.score >= MIN_SCORE)
        .collect();
    levels.sort_by(|a, b| b.score.cmp(&a.score));
    levels
}

fn cluster(candidates: &[Candidate], tolerance: Decimal) -> Vec<Vec<Candidate>> {
    let mut clusters: Vec<Vec<Candidate>> = Vec::new();
    for &candidate in candidates {
        match clusters.last_mut() {
            Some(last) if candidate.price - last.last().unwrap().price <= tolerance => {
                last.push(candidate);
            }
            _ => clusters.push(vec![candidate]),
        }
    }
    clusters
}

fn score_cluster(members: &[Candidate], bars: &[volarix_core::Bar], decision_index: usize) -> Level {
    let touches = members.len() as u32;
    let sum: Decimal = members.iter().map(|c| c.price).sum();
    let price = sum / Decimal::from(members.len() as u32);

    let highs = members
        .iter()
        .filter(|c| c.kind == LevelKind::Resistance)
        .count();
    let lows = members.len() - highs;
    let kind = if highs >= lows {
        LevelKind::Resistance
    } else {
        LevelKind::Support
    };

    let last_touch_index = members.iter().map(|c| c.index).max().unwrap_or(0);

    let mut score: i32 = 20 * touches as i32;

    if decision_index.saturating_sub(last_touch_index) <= RECENT_TOUCH_WINDOW {
        score += 50;
    }

    let strong_wick = members.iter().any(|c| {
        let bar = &bars[c.index];
        let body = bar.body();
        if body.is_zero() {
            return false;
        }
        match c.kind {
            LevelKind::Resistance => bar.upper_wick() / body > Decimal::new(15, 1),
            LevelKind::Support => bar.lower_wick() / body > Decimal::new(15, 1),
        }
    });
    if strong_wick {
        score += 20;
    }

    let score = score.clamp(0, 100) as u8;

    Level {
        price,
        kind,
        score,
        last_touch_index,
        touches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;
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
    fn no_swings_in_flat_series_yields_no_levels() {
        let bars = flat_bars(220, dec!(1.1000));
        let window = BarWindow::new("EURUSD", Timeframe::H1, bars).unwrap();
        assert!(detect(&window).is_empty());
    }

    #[test]
    fn a_clean_swing_low_forms_a_support_candidate() {
        let mut bars = flat_bars(220, dec!(1.1000));
        // Carve out a clear swing low well inside the lookback window.
        let dip_index = bars.len() - 20;
        bars[dip_index].low = dec!(1.0950);
        bars[dip_index].close = dec!(1.0960);
        bars[dip_index].open = dec!(1.0965);
        let window = BarWindow::new("EURUSD", Timeframe::H1, bars).unwrap();
        let levels = detect(&window);
        assert!(levels.iter().any(|l| l.kind == LevelKind::Support));
    }
}
