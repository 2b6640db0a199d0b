//! Root configuration structs and TOML loading
//!
//! Every struct implements `Default`, so a missing or partial config
//! file never changes behavior beyond the keys it actually sets.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use super::defaults;

/// Tier cut points for nutrient classification.
///
/// `yellow_level <= red_level` is the intended shape. A violated
/// invariant only collapses the yellow band — classification stays
/// total and deterministic — so it is warned about, never rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    /// Values below this are green (g per serving)
    #[serde(default = "default_yellow_level")]
    pub yellow_level: f64,
    /// Values at or above this are red (g per serving)
    #[serde(default = "default_red_level")]
    pub red_level: f64,
}

fn default_yellow_level() -> f64 {
    defaults::YELLOW_LEVEL
}

fn default_red_level() -> f64 {
    defaults::RED_LEVEL
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            yellow_level: defaults::YELLOW_LEVEL,
            red_level: defaults::RED_LEVEL,
        }
    }
}

/// Catalog transport settings.
///
/// The request timeout lives here, at the transport boundary — the
/// pipeline itself carries no timeout policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key sent with every request (`USDA_API_KEY` env in the binary)
    #[serde(default)]
    pub api_key: String,
    /// NDB nutrient number requested in the report
    #[serde(default = "default_nutrient_id")]
    pub nutrient_id: String,
    /// Request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    defaults::USDA_BASE_URL.to_string()
}

fn default_nutrient_id() -> String {
    defaults::SUGAR_NUTRIENT.to_string()
}

fn default_timeout_secs() -> u64 {
    defaults::REQUEST_TIMEOUT_SECS
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::USDA_BASE_URL.to_string(),
            api_key: String::new(),
            nutrient_id: defaults::SUGAR_NUTRIENT.to_string(),
            timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Tier cut points
    #[serde(default)]
    pub thresholds: TierThresholds,
    /// Catalog transport settings
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl AppConfig {
    /// Load configuration using the standard search order:
    /// 1. `NUTRIWATCH_CONFIG` environment variable
    /// 2. `./nutriwatch.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("NUTRIWATCH_CONFIG") {
            info!("Loading config from NUTRIWATCH_CONFIG: {}", path);
            return Self::load_from(Path::new(&path));
        }

        let local = Path::new("nutriwatch.toml");
        if local.exists() {
            return Self::load_from(local);
        }

        info!("No config file found — using built-in defaults");
        Self::default()
    }

    /// Load configuration from a specific TOML file, falling back to
    /// defaults (with a warning) on read or parse failure.
    pub fn load_from(path: &Path) -> Self {
        let config = match std::fs::read_to_string(path) {
            Ok(text) => match toml::from_str::<Self>(&text) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!(
                        "Failed to parse {} — using built-in defaults: {}",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                warn!(
                    "Failed to read {} — using built-in defaults: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        };
        config.warn_on_degenerate_thresholds();
        config
    }

    fn warn_on_degenerate_thresholds(&self) {
        if self.thresholds.yellow_level > self.thresholds.red_level {
            warn!(
                "yellow_level ({}) exceeds red_level ({}) — the yellow tier is unreachable",
                self.thresholds.yellow_level, self.thresholds.red_level,
            );
        }
    }
}
