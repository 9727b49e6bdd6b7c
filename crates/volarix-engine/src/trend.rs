use rust_decimal::prelude::ToPrimitive;
use volarix_core::BarWindow;

/// Trend classification carried from [`classify`] to the alignment gate;
/// this stage never rejects on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Uptrend,
    Downtrend,
    Ranging,
}

const FAST_SPAN: usize = 20;
const SLOW_SPAN: usize = 50;

/// Exponential moving average, seeded with a simple average of the first
/// `period` values, following `technical-analysis::indicators::ema`.
fn ema(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let seed = data[..period].iter().sum::<f64>() / period as f64;

    let mut result = Vec::with_capacity(data.len());
    for _ in 0..period {
        result.push(seed);
    }
    for i in period..data.len() {
        let prev = result[i - 1];
        result.push((data[i] - prev) * multiplier + prev);
    }
    result
}

/// Classifies the trend at the decision bar from EMA(20)/EMA(50) of the
/// close series. Spans are fixed; changing them breaks parity between a
/// live evaluation and an offline backtest replaying the same bars.
pub fn classify(window: &BarWindow) -> Trend {
    let closes: Vec<f64> = window
        .bars()
        .iter()
        .map(|b| b.close.to_f64().unwrap_or(0.0))
        .collect();

    let ema20 = ema(&closes, FAST_SPAN);
    let ema50 = ema(&closes, SLOW_SPAN);

    if ema20.is_empty() || ema50.is_empty() {
        return Trend::Ranging;
    }

    let fast = *ema20.last().unwrap();
    let slow = *ema50.last().unwrap();

    if fast > slow {
        Trend::Uptrend
    } else if fast < slow {
        Trend::Downtrend
    } else {
        Trend::Ranging
    }
}
