pub mod bar_window;
pub mod error;
pub mod params;
pub mod pips;
pub mod signal;
pub mod types;

pub use bar_window::{BarWindow, MIN_LOOKBACK};
pub use error::{BarInvariant, VolarixError};
pub use params::{ParamOverrides, Params};
pub use pips::pip_value;
pub use signal::{format_price, Signal, SignalDetails};
pub use types::{
    Bar, BrokenLevel, CostModel, Direction, Level, LevelKind, RejectionPattern, Timeframe,
    TradeSetup,
};
