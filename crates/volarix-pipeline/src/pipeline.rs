use volarix_core::{
    BarWindow, Direction, ParamOverrides, Params, Signal, SignalDetails, Timeframe, VolarixError,
};
use volarix_engine::{confidence_gate, cluster_tolerance, rejection, session, setup, sr, trend, trend_alignment_gate};
use volarix_state::{BrokenLevelStore, CooldownStore};

/// Sequences the ten decision stages in order and owns the two
/// process-wide stores, the way `AnalysisOrchestrator` owns its engines
/// and caches. One `Pipeline` is meant to live for the life of a process;
/// tests construct a fresh instance per case for isolation.
pub struct Pipeline {
    broken_levels: BrokenLevelStore,
    cooldowns: CooldownStore,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            broken_levels: BrokenLevelStore::new(),
            cooldowns: CooldownStore::new(),
        }
    }

    /// Read-only accessor used by introspection callers.
    pub fn broken_levels(&self) -> &BrokenLevelStore {
        &self.broken_levels
    }

    /// Read-only accessor used by introspection callers.
    pub fn cooldowns(&self) -> &CooldownStore {
        &self.cooldowns
    }

    /// Evaluates one `(symbol, timeframe, bars)` request and returns a
    /// `Signal`. `InvalidBars`/`InvalidParams` are the only `Err` paths;
    /// every other negative outcome is a `Signal::Hold` value.
    pub fn evaluate(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        bars: Vec<volarix_core::Bar>,
        overrides: ParamOverrides,
    ) -> Result<Signal, VolarixError> {
        let params = Params::with_overrides(overrides)?;
        let window = BarWindow::new(symbol, timeframe, bars)?;

        tracing::debug!(symbol, bars = window.len(), "pipeline invoked");

        if let Err(reason) = session::check(&window) {
            return Ok(Signal::Hold {
                reason: reason.to_string(),
            });
        }

        let trend = trend::classify(&window);
        let pip_value = window.pip_value();
        let decision_time = window.decision_bar().time;

        let levels = sr::detect(&window);
        if levels.is_empty() {
            return Ok(Signal::Hold {
                reason: "No significant S/R levels detected".to_string(),
            });
        }

        let tolerance = cluster_tolerance(pip_value);
        let break_threshold = rust_decimal::Decimal::from_f64_retain(params.broken_level_break_pips)
            .unwrap_or_default()
            * pip_value;

        let surviving = self
            .broken_levels
            .filter_active(symbol, levels, decision_time, tolerance);

        if surviving.is_empty() {
            return Ok(Signal::Hold {
                reason: format!(
                    "All S/R levels broken or in cooldown period ({}h)",
                    params.broken_level_cooldown_hours as i64
                ),
            });
        }

        self.broken_levels.update(
            symbol,
            window.bars(),
            &surviving,
            break_threshold,
            tolerance,
            params.broken_level_cooldown_hours,
        );

        let pattern = match rejection::detect(&window, &surviving) {
            Some(p) => p,
            None => {
                return Ok(Signal::Hold {
                    reason: "No rejection pattern at valid S/R levels".to_string(),
                })
            }
        };

        if let Err(reason) = confidence_gate(pattern.confidence, params.min_confidence) {
            return Ok(Signal::Hold { reason });
        }

        let alignment = match trend_alignment_gate(trend, pattern.direction, pattern.confidence) {
            Ok(outcome) => outcome,
            Err(reason) => return Ok(Signal::Hold { reason }),
        };

        if let Err(next_allowed) =
            self.cooldowns
                .check(symbol, decision_time, params.signal_cooldown_hours)
        {
            return Ok(Signal::Hold {
                reason: format!(
                    "Signal cooldown active: next signal allowed after {}",
                    next_allowed.to_rfc3339()
                ),
            });
        }

        let entry = window.decision_bar().close;
        let trade_setup = match setup::compute(pattern.level.price, pattern.direction, entry, pip_value) {
            Ok(s) => s,
            Err(reason) => return Ok(Signal::Hold { reason }),
        };

        if let Err(reason) = setup::check_edge(&trade_setup, pip_value, &params.cost, params.min_edge_pips) {
            return Ok(Signal::Hold { reason });
        }

        self.cooldowns.record(symbol, decision_time);

        let level_label = pattern.level.kind.label();
        let reason = setup::acceptance_reason(
            level_label,
            pattern.level.price,
            pattern.level.score,
            alignment.bypassed,
            pattern.confidence,
        );

        tracing::info!(
            symbol,
            direction = ?pattern.direction,
            confidence = pattern.confidence,
            "signal accepted"
        );

        let details = SignalDetails {
            setup: trade_setup,
            confidence: pattern.confidence,
            reason,
        };

        Ok(match pattern.direction {
            Direction::Buy => Signal::Buy { details },
            Direction::Sell => Signal::Sell { details },
        })
    }
}
