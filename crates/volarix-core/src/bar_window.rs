use rust_decimal::Decimal;

use crate::error::{BarInvariant, VolarixError};
use crate::pips::pip_value;
use crate::types::{Bar, Timeframe};

/// Minimum window length accepted by [`BarWindow::new`]; 200 bars gives the
/// EMA(50) trend filter a stable seed. The canonical request size is 400.
pub const MIN_LOOKBACK: usize = 200;

/// Maximum tolerated inter-bar gap, in timeframe periods, before it is
/// treated as a data error rather than a weekend/holiday gap.
const MAX_GAP_PERIODS: i64 = 168;

/// A validated, ordered sequence of closed bars for one `(symbol,
/// timeframe)`. Construction is the only way to get one; every invariant
/// below holds for the lifetime of the value.
#[derive(Debug, Clone, PartialEq)]
pub struct BarWindow {
    symbol: String,
    timeframe: Timeframe,
    bars: Vec<Bar>,
    pip_value: Decimal,
}

impl BarWindow {
    /// Validates `bars` against every §4.1 invariant and, on success,
    /// takes ownership of the sequence.
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe, bars: Vec<Bar>) -> Result<Self, VolarixError> {
        let symbol = symbol.into();
        Self::validate(&bars, timeframe)?;
        let pip_value = pip_value(&symbol);
        Ok(Self {
            symbol,
            timeframe,
            bars,
            pip_value,
        })
    }

    fn validate(bars: &[Bar], timeframe: Timeframe) -> Result<(), VolarixError> {
        if bars.len() < MIN_LOOKBACK {
            return Err(VolarixError::InvalidBars(BarInvariant::InsufficientLength));
        }

        let period = timeframe.period_seconds();

        for bar in bars {
            if bar.time.timestamp() == 0 {
                return Err(VolarixError::InvalidBars(BarInvariant::ZeroTimestamp));
            }
            if !(bar.low <= bar.open.min(bar.close)
                && bar.open.max(bar.close) <= bar.high
                && bar.low <= bar.high)
            {
                return Err(VolarixError::InvalidBars(BarInvariant::InvalidCandleGeometry));
            }
        }

        for pair in bars.windows(2) {
            let delta = pair[1].time.timestamp() - pair[0].time.timestamp();
            if delta <= 0 {
                return Err(VolarixError::InvalidBars(BarInvariant::NotStrictlyIncreasing));
            }
            if delta % period != 0 {
                return Err(VolarixError::InvalidBars(BarInvariant::MisalignedDelta));
            }
            if delta > period * MAX_GAP_PERIODS {
                return Err(VolarixError::InvalidBars(BarInvariant::GapExceeded));
            }
        }

        Ok(())
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn pip_value(&self) -> Decimal {
        self.pip_value
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    /// The most recent, fully-closed bar: the one the pipeline decides on.
    pub fn decision_bar(&self) -> &Bar {
        self.bars.last().expect("validated window is never empty")
    }

    /// Index of the decision bar.
    pub fn decision_index(&self) -> usize {
        self.bars.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn bar_at(ts: DateTime<Utc>, close: Decimal) -> Bar {
        Bar {
            time: ts,
            open: close,
            high: close + dec!(0.0010),
            low: close - dec!(0.0010),
            close,
            volume: 100,
        }
    }

    fn hourly_series(n: usize) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| bar_at(start + chrono::Duration::hours(i as i64), dec!(1.1000)))
            .collect()
    }

    #[test]
    fn rejects_too_short_window() {
        let bars = hourly_series(MIN_LOOKBACK - 1);
        let err = BarWindow::new("EURUSD", Timeframe::H1, bars).unwrap_err();
        assert_eq!(
            err,
            VolarixError::InvalidBars(BarInvariant::InsufficientLength)
        );
    }

    #[test]
    fn accepts_minimum_length_window() {
        let bars = hourly_series(MIN_LOOKBACK);
        let window = BarWindow::new("EURUSD", Timeframe::H1, bars).unwrap();
        assert_eq!(window.len(), MIN_LOOKBACK);
    }

    #[test]
    fn rejects_non_increasing_timestamps() {
        let mut bars = hourly_series(MIN_LOOKBACK + 1);
        bars.swap(0, 1);
        let err = BarWindow::new("EURUSD", Timeframe::H1, bars).unwrap_err();
        assert_eq!(
            err,
            VolarixError::InvalidBars(BarInvariant::NotStrictlyIncreasing)
        );
    }

    #[test]
    fn rejects_misaligned_delta() {
        let mut bars = hourly_series(MIN_LOOKBACK);
        let last = bars.last().unwrap().time;
        bars.push(bar_at(last + chrono::Duration::minutes(90), dec!(1.1000)));
        let err = BarWindow::new("EURUSD", Timeframe::H1, bars).unwrap_err();
        assert_eq!(
            err,
            VolarixError::InvalidBars(BarInvariant::MisalignedDelta)
        );
    }

    #[test]
    fn rejects_gap_exceeding_168_periods() {
        let mut bars = hourly_series(MIN_LOOKBACK);
        let last = bars.last().unwrap().time;
        bars.push(bar_at(last + chrono::Duration::hours(169), dec!(1.1000)));
        let err = BarWindow::new("EURUSD", Timeframe::H1, bars).unwrap_err();
        assert_eq!(err, VolarixError::InvalidBars(BarInvariant::GapExceeded));
    }

    #[test]
    fn tolerates_weekend_gap_within_168_periods() {
        let mut bars = hourly_series(MIN_LOOKBACK);
        let last = bars.last().unwrap().time;
        bars.push(bar_at(last + chrono::Duration::hours(168), dec!(1.1000)));
        let window = BarWindow::new("EURUSD", Timeframe::H1, bars).unwrap();
        assert_eq!(window.len(), MIN_LOOKBACK + 1);
    }

    #[test]
    fn rejects_zero_timestamp() {
        let mut bars = hourly_series(MIN_LOOKBACK);
        bars[0].time = Utc.timestamp_opt(0, 0).unwrap();
        let err = BarWindow::new("EURUSD", Timeframe::H1, bars).unwrap_err();
        assert_eq!(err, VolarixError::InvalidBars(BarInvariant::ZeroTimestamp));
    }

    #[test]
    fn rejects_bad_candle_geometry() {
        let mut bars = hourly_series(MIN_LOOKBACK);
        bars[5].high = bars[5].low - dec!(0.0001);
        let err = BarWindow::new("EURUSD", Timeframe::H1, bars).unwrap_err();
        assert_eq!(
            err,
            VolarixError::InvalidBars(BarInvariant::InvalidCandleGeometry)
        );
    }

    #[test]
    fn decision_bar_is_last_element() {
        let bars = hourly_series(MIN_LOOKBACK);
        let last_time = bars.last().unwrap().time;
        let window = BarWindow::new("EURUSD", Timeframe::H1, bars).unwrap();
        assert_eq!(window.decision_bar().time, last_time);
        assert_eq!(window.decision_index(), MIN_LOOKBACK - 1);
    }
}
