use volarix_core::Direction;

use crate::trend::Trend;

/// Bypass threshold: at or above this confidence, the alignment gate
/// never rejects.
const BYPASS_CONFIDENCE: f64 = 0.75;

/// Rejects a candidate whose confidence falls below `min_confidence`.
/// Returns the canonical reason string on rejection.
pub fn confidence_gate(confidence: f64, min_confidence: f64) -> Result<(), String> {
    if confidence < min_confidence {
        Err(format!(
            "Confidence below threshold ({confidence:.2} < {min_confidence:.2})"
        ))
    } else {
        Ok(())
    }
}

/// Outcome of the trend-alignment gate: whether it fired and, if so,
/// whether via an explicit bypass (confidence >= 0.75) that the acceptance
/// reason must note.
pub struct AlignmentOutcome {
    pub bypassed: bool,
}

/// Checks trend/direction alignment, with a confidence-based bypass.
pub fn trend_alignment_gate(
    trend: Trend,
    direction: Direction,
    confidence: f64,
) -> Result<AlignmentOutcome, String> {
    if confidence >= BYPASS_CONFIDENCE {
        return Ok(AlignmentOutcome { bypassed: true });
    }

    let aligned = matches!(
        (trend, direction),
        (Trend::Uptrend, Direction::Buy) | (Trend::Downtrend, Direction::Sell) | (Trend::Ranging, _)
    );

    if aligned {
        Ok(AlignmentOutcome { bypassed: false })
    } else {
        let trend_label = match trend {
            Trend::Uptrend => "UPTREND",
            Trend::Downtrend => "DOWNTREND",
            Trend::Ranging => "RANGING",
        };
        let direction_label = match direction {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        };
        Err(format!(
            "Trend alignment failed: {direction_label} in {trend_label}"
        ))
    }
}
