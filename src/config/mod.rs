//! Application configuration
//!
//! Tier thresholds and catalog transport settings loaded from TOML,
//! with built-in defaults when no file is present.
//!
//! ## Loading Order
//!
//! 1. `NUTRIWATCH_CONFIG` environment variable (path to TOML file)
//! 2. `nutriwatch.toml` in the current working directory
//! 3. Built-in defaults

mod app_config;
pub mod defaults;

pub use app_config::{AppConfig, CatalogConfig, TierThresholds};
