//! Built-in default settings

/// Nutrient values at or above this leave the green tier (g per serving)
pub const YELLOW_LEVEL: f64 = 10.0;
/// Nutrient values at or above this enter the red tier (g per serving)
pub const RED_LEVEL: f64 = 20.0;

/// USDA NDB base URL
pub const USDA_BASE_URL: &str = "https://api.nal.usda.gov";
/// NDB nutrient number for "Sugars, total"
pub const SUGAR_NUTRIENT: &str = "269";
/// Catalog request timeout (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
