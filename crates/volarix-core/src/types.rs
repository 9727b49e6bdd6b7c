use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Timeframe of a bar window; determines the period used for alignment and
/// gap checks in [`crate::BarWindow::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    M1,
    M5,
    M15,
    M30,
    H1,
    H4,
    D1,
    W1,
}

impl Timeframe {
    /// Length of one bar, in seconds.
    pub fn period_seconds(self) -> i64 {
        match self {
            Timeframe::M1 => 60,
            Timeframe::M5 => 5 * 60,
            Timeframe::M15 => 15 * 60,
            Timeframe::M30 => 30 * 60,
            Timeframe::H1 => 60 * 60,
            Timeframe::H4 => 4 * 60 * 60,
            Timeframe::D1 => 24 * 60 * 60,
            Timeframe::W1 => 7 * 24 * 60 * 60,
        }
    }
}

/// One closed OHLCV candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

impl Bar {
    /// `|close - open|`
    pub fn body(&self) -> Decimal {
        (self.close - self.open).abs()
    }

    /// `high - max(open, close)`
    pub fn upper_wick(&self) -> Decimal {
        self.high - self.open.max(self.close)
    }

    /// `min(open, close) - low`
    pub fn lower_wick(&self) -> Decimal {
        self.open.min(self.close) - self.low
    }

    /// `high - low`
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// `(close - low) / range`, `None` for a zero-range bar.
    pub fn close_position(&self) -> Option<f64> {
        let range = self.range();
        if range.is_zero() {
            return None;
        }
        let pos = (self.close - self.low) / range;
        pos.to_f64()
    }
}

/// Kind of a support/resistance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelKind {
    Support,
    Resistance,
}

impl LevelKind {
    pub fn label(self) -> &'static str {
        match self {
            LevelKind::Support => "Support",
            LevelKind::Resistance => "Resistance",
        }
    }
}

/// Trade direction a rejection pattern or signal argues for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Buy,
    Sell,
}

/// A clustered, scored support/resistance level. Recomputed per request;
/// not persisted across invocations (see [`crate::BrokenLevel`] for the
/// state that *is* persisted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub price: Decimal,
    pub kind: LevelKind,
    pub score: u8,
    pub last_touch_index: usize,
    pub touches: u32,
}

/// A level that price has broken through, remembered per-symbol in
/// [`volarix_state`](../volarix_state) until `cooldown_until` elapses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokenLevel {
    pub price: Decimal,
    pub kind: LevelKind,
    pub broken_at: DateTime<Utc>,
    pub cooldown_until: DateTime<Utc>,
}

/// A pin-bar rejection found against a surviving level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionPattern {
    pub bar_index: usize,
    pub direction: Direction,
    pub level: Level,
    pub wick_body_ratio: f64,
    pub close_position: f64,
    pub confidence: f64,
}

/// Entry/SL/TP geometry for an accepted signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeSetup {
    pub entry: Decimal,
    pub sl: Decimal,
    pub tp1: Decimal,
    pub tp2: Decimal,
    pub tp3: Decimal,
    pub tp_fractions: (f64, f64, f64),
}

impl TradeSetup {
    pub const TP_FRACTIONS: (f64, f64, f64) = (0.4, 0.4, 0.2);

    /// `true` if the BUY ordering `sl < entry < tp1 < tp2 < tp3` holds.
    pub fn buy_geometry_valid(&self) -> bool {
        self.sl < self.entry && self.entry < self.tp1 && self.tp1 < self.tp2 && self.tp2 < self.tp3
    }

    /// `true` if the SELL ordering `tp3 < tp2 < tp1 < entry < sl` holds.
    pub fn sell_geometry_valid(&self) -> bool {
        self.tp3 < self.tp2 && self.tp2 < self.tp1 && self.tp1 < self.entry && self.entry < self.sl
    }
}

/// Round-trip trading cost model, in pips and per-lot USD terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    pub spread_pips: f64,
    pub slippage_pips: f64,
    pub commission_per_side_per_lot: f64,
    pub usd_per_pip_per_lot: f64,
    pub lot_size: f64,
}

impl CostModel {
    /// `spread + 2*slippage + (2*commission*lot_size)/usd_per_pip_per_lot`
    pub fn total_cost_pips(&self) -> f64 {
        let commission_pips = if self.usd_per_pip_per_lot > 0.0 {
            (2.0 * self.commission_per_side_per_lot * self.lot_size) / self.usd_per_pip_per_lot
        } else {
            0.0
        };
        self.spread_pips + 2.0 * self.slippage_pips + commission_pips
    }
}
