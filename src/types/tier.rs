//! Severity tiers for classified foods

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity tier derived from a food's nutrient value against the
/// configured thresholds.
///
/// `Unknown` covers negative values and foods with no nutrient entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Green,
    Yellow,
    Red,
    Unknown,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Red => "RED",
            Self::Unknown => "UNKNOWN",
        };
        write!(f, "{label}")
    }
}
