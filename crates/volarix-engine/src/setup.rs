use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use volarix_core::{format_price, CostModel, Direction, TradeSetup};

/// Distance beyond the level at which the stop-loss sits, in pips.
const SL_PIPS_BEYOND: Decimal = dec!(10);

/// Computes entry/SL/TP geometry from the candidate level and direction.
/// `entry` is always the decision-bar close; the core never recomputes
/// against a later fill price.
pub fn compute(
    level_price: Decimal,
    direction: Direction,
    entry: Decimal,
    pip_value: Decimal,
) -> Result<TradeSetup, String> {
    let beyond = SL_PIPS_BEYOND * pip_value;

    let setup = match direction {
        Direction::Buy => {
            let sl = level_price - beyond;
            let risk = entry - sl;
            if risk <= Decimal::ZERO {
                return Err("Invalid geometry".to_string());
            }
            TradeSetup {
                entry,
                sl,
                tp1: entry + risk,
                tp2: entry + risk * Decimal::from(2),
                tp3: entry + risk * Decimal::from(3),
                tp_fractions: TradeSetup::TP_FRACTIONS,
            }
        }
        Direction::Sell => {
            let sl = level_price + beyond;
            let risk = sl - entry;
            if risk <= Decimal::ZERO {
                return Err("Invalid geometry".to_string());
            }
            TradeSetup {
                entry,
                sl,
                tp1: entry - risk,
                tp2: entry - risk * Decimal::from(2),
                tp3: entry - risk * Decimal::from(3),
                tp_fractions: TradeSetup::TP_FRACTIONS,
            }
        }
    };

    let geometry_ok = match direction {
        Direction::Buy => setup.buy_geometry_valid(),
        Direction::Sell => setup.sell_geometry_valid(),
    };
    if !geometry_ok {
        return Err("Invalid geometry".to_string());
    }

    Ok(setup)
}

/// Checks the cost-adjusted minimum-edge requirement.
pub fn check_edge(
    setup: &TradeSetup,
    pip_value: Decimal,
    cost: &CostModel,
    min_edge_pips: f64,
) -> Result<(), String> {
    let tp1_distance_pips = ((setup.tp1 - setup.entry).abs() / pip_value)
        .to_f64()
        .unwrap_or(0.0);
    let total_cost_pips = cost.total_cost_pips();
    let required = total_cost_pips + min_edge_pips;

    if tp1_distance_pips > required {
        Ok(())
    } else {
        Err(format!(
            "Insufficient edge after costs (TP1 {tp1_distance_pips:.1} pips <= costs {total_cost_pips:.1} + edge {min_edge_pips:.1})"
        ))
    }
}

/// Builds the canonical acceptance reason string, appending a bypass note
/// when the trend-alignment gate bypassed.
pub fn acceptance_reason(
    level_kind_label: &str,
    level_price: Decimal,
    score: u8,
    bypassed: bool,
    confidence: f64,
) -> String {
    let base = format!(
        "{} bounce at {}, score {}",
        level_kind_label,
        format_price(level_price),
        score
    );
    if bypassed {
        format!("{base} (trend filter bypassed: confidence {confidence:.2} >= 0.75)")
    } else {
        base
    }
}
