//! Nutriwatch: Food Nutrient Severity Classification
//!
//! Fetches nutrient reports for food items from the USDA catalog and
//! classifies each food into a severity tier (green/yellow/red/unknown)
//! based on its first nutrient value.
//!
//! ## Architecture
//!
//! - **Pipeline**: fetch → parse → classify → emit, one request per call
//! - **Catalog**: swappable transport behind the `FoodCatalog` trait
//! - **Relay**: broadcast channels with latest-value replay

pub mod catalog;
pub mod config;
pub mod pipeline;
pub mod relay;
pub mod types;

// Re-export commonly used types
pub use catalog::{CatalogError, FoodCatalog, UsdaClient};
pub use config::{AppConfig, CatalogConfig, TierThresholds};
pub use pipeline::{classify, FoodChannels, FoodPipeline, PipelineError};
pub use relay::{Relay, RelaySubscription};
pub use types::{Food, FoodNutrient, FoodResponse, Tier};
