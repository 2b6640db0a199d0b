//! Tier classification against configured cut points

use crate::config::TierThresholds;
use crate::types::Tier;

/// Classify a parsed nutrient value.
///
/// Total and deterministic for every `f64`, including degenerate
/// threshold configurations (yellow above red collapses the yellow
/// band; NaN fails every comparison and lands on Red).
pub fn classify(value: f64, thresholds: &TierThresholds) -> Tier {
    if value < 0.0 {
        Tier::Unknown
    } else if value < thresholds.yellow_level {
        Tier::Green
    } else if value < thresholds.red_level {
        Tier::Yellow
    } else {
        Tier::Red
    }
}
