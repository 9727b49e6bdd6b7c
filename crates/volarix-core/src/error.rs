use std::fmt;

use thiserror::Error;

/// The single rule a [`BarWindow`](crate::BarWindow) failed to satisfy.
///
/// Each variant corresponds to exactly one of the invariants a caller must
/// fix before the window can be constructed; there is no partial or
/// best-effort construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarInvariant {
    /// Bar timestamps are not strictly increasing.
    NotStrictlyIncreasing,
    /// A bar carries a zero (epoch) timestamp.
    ZeroTimestamp,
    /// An inter-bar delta is not a positive integer multiple of the
    /// timeframe period.
    MisalignedDelta,
    /// An inter-bar delta exceeds 168 timeframe periods.
    GapExceeded,
    /// The window is shorter than the minimum lookback.
    InsufficientLength,
    /// A candle's `low <= min(open, close) <= max(open, close) <= high`
    /// invariant does not hold; see DESIGN.md for why this rule has its
    /// own variant alongside the bar-sequencing ones.
    InvalidCandleGeometry,
}

impl fmt::Display for BarInvariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            BarInvariant::NotStrictlyIncreasing => "strictly increasing timestamps",
            BarInvariant::ZeroTimestamp => "zero timestamp",
            BarInvariant::MisalignedDelta => "alignment to timeframe",
            BarInvariant::GapExceeded => "gap exceeds 168 periods",
            BarInvariant::InsufficientLength => "insufficient bars (< minimum lookback)",
            BarInvariant::InvalidCandleGeometry => "candle geometry (low/high bounds)",
        };
        f.write_str(msg)
    }
}

/// The only error type the core surfaces to callers. Every other negative
/// outcome is a [`Signal::Hold`](crate::Signal::Hold) value, not an `Err`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VolarixError {
    #[error("invalid bars: {0}")]
    InvalidBars(BarInvariant),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}
