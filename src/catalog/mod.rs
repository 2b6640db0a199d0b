//! Food catalog transport
//!
//! The pipeline talks to the catalog through the `FoodCatalog` trait;
//! `UsdaClient` is the production `reqwest` implementation. Tests
//! substitute scripted implementations.

mod client;

pub use client::UsdaClient;

use async_trait::async_trait;

use crate::types::FoodResponse;

/// Catalog transport errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned status {0}")]
    ServerError(reqwest::StatusCode),
    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Remote food catalog capability.
///
/// One food identifier in, one nutrient report out. An empty or missing
/// food list inside the response is a valid outcome here — the pipeline
/// decides what it means.
#[async_trait]
pub trait FoodCatalog: Send + Sync {
    async fn get_food_item(&self, food_id: &str) -> Result<FoodResponse, CatalogError>;
}
