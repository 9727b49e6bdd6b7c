use crate::error::VolarixError;
use crate::types::CostModel;

/// Typed, defaulted configuration for a pipeline invocation: a single
/// struct with an explicit [`Default`] impl, in the style of
/// `risk-manager::models::RiskParameters`, rather than a dictionary of
/// heterogeneous config where a missing key means "use default".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Params {
    pub min_confidence: f64,
    pub broken_level_cooldown_hours: f64,
    pub broken_level_break_pips: f64,
    pub min_edge_pips: f64,
    pub signal_cooldown_hours: f64,
    pub cost: CostModel,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            min_confidence: 0.60,
            broken_level_cooldown_hours: 48.0,
            broken_level_break_pips: 15.0,
            min_edge_pips: 4.0,
            signal_cooldown_hours: 2.0,
            cost: CostModel {
                spread_pips: 1.0,
                slippage_pips: 0.5,
                commission_per_side_per_lot: 7.0,
                usd_per_pip_per_lot: 10.0,
                lot_size: 1.0,
            },
        }
    }
}

/// Per-field overrides for [`Params`]. A field left `None` falls back to
/// [`Params::default`] -- "`null` means use default" expressed as typed
/// `Option` fields rather than a dynamically typed map.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParamOverrides {
    pub min_confidence: Option<f64>,
    pub broken_level_cooldown_hours: Option<f64>,
    pub broken_level_break_pips: Option<f64>,
    pub min_edge_pips: Option<f64>,
    pub signal_cooldown_hours: Option<f64>,
    pub spread_pips: Option<f64>,
    pub slippage_pips: Option<f64>,
    pub commission_per_side_per_lot: Option<f64>,
    pub usd_per_pip_per_lot: Option<f64>,
    pub lot_size: Option<f64>,
}

impl Params {
    /// Build a [`Params`] from [`Params::default`] plus any overrides.
    pub fn with_overrides(overrides: ParamOverrides) -> Result<Self, VolarixError> {
        let defaults = Self::default();
        let params = Self {
            min_confidence: overrides.min_confidence.unwrap_or(defaults.min_confidence),
            broken_level_cooldown_hours: overrides
                .broken_level_cooldown_hours
                .unwrap_or(defaults.broken_level_cooldown_hours),
            broken_level_break_pips: overrides
                .broken_level_break_pips
                .unwrap_or(defaults.broken_level_break_pips),
            min_edge_pips: overrides.min_edge_pips.unwrap_or(defaults.min_edge_pips),
            signal_cooldown_hours: overrides
                .signal_cooldown_hours
                .unwrap_or(defaults.signal_cooldown_hours),
            cost: CostModel {
                spread_pips: overrides.spread_pips.unwrap_or(defaults.cost.spread_pips),
                slippage_pips: overrides
                    .slippage_pips
                    .unwrap_or(defaults.cost.slippage_pips),
                commission_per_side_per_lot: overrides
                    .commission_per_side_per_lot
                    .unwrap_or(defaults.cost.commission_per_side_per_lot),
                usd_per_pip_per_lot: overrides
                    .usd_per_pip_per_lot
                    .unwrap_or(defaults.cost.usd_per_pip_per_lot),
                lot_size: overrides.lot_size.unwrap_or(defaults.cost.lot_size),
            },
        };
        params.validate()?;
        Ok(params)
    }

    /// Rejects nonsensical parameter combinations the way
    /// `risk-manager::manager` guards against a non-positive
    /// `risk_per_share` before dividing by it.
    pub fn validate(&self) -> Result<(), VolarixError> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(VolarixError::InvalidParams(
                "min_confidence must be within [0, 1]".to_string(),
            ));
        }
        if self.broken_level_cooldown_hours < 0.0 {
            return Err(VolarixError::InvalidParams(
                "broken_level_cooldown_hours must be non-negative".to_string(),
            ));
        }
        if self.broken_level_break_pips <= 0.0 {
            return Err(VolarixError::InvalidParams(
                "broken_level_break_pips must be positive".to_string(),
            ));
        }
        if self.min_edge_pips < 0.0 {
            return Err(VolarixError::InvalidParams(
                "min_edge_pips must be non-negative".to_string(),
            ));
        }
        if self.signal_cooldown_hours < 0.0 {
            return Err(VolarixError::InvalidParams(
                "signal_cooldown_hours must be non-negative".to_string(),
            ));
        }
        if self.cost.lot_size <= 0.0 {
            return Err(VolarixError::InvalidParams(
                "lot_size must be positive".to_string(),
            ));
        }
        if self.cost.usd_per_pip_per_lot <= 0.0 {
            return Err(VolarixError::InvalidParams(
                "usd_per_pip_per_lot must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
