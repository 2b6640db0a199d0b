//! USDA NDB client — HTTP transport for nutrient report requests

use async_trait::async_trait;
use tracing::debug;

use crate::config::CatalogConfig;
use crate::types::FoodResponse;

use super::{CatalogError, FoodCatalog};

/// HTTP client for the USDA NDB nutrient report endpoint
#[derive(Clone)]
pub struct UsdaClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    nutrient_id: String,
}

impl UsdaClient {
    /// Create a new catalog client from transport settings.
    pub fn new(config: &CatalogConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            nutrient_id: config.nutrient_id.clone(),
        }
    }

    /// Get base URL for logging
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl FoodCatalog for UsdaClient {
    async fn get_food_item(&self, food_id: &str) -> Result<FoodResponse, CatalogError> {
        debug!("[UsdaClient] GET nutrient report for ndbno={}", food_id);

        let resp = self
            .http
            .get(format!("{}/ndb/nutrients", self.base_url))
            .query(&[
                ("ndbno", food_id),
                ("api_key", self.api_key.as_str()),
                ("nutrients", self.nutrient_id.as_str()),
            ])
            .send()
            .await?;

        match resp.status() {
            reqwest::StatusCode::OK => {
                let body = resp.bytes().await?;
                let response: FoodResponse = serde_json::from_slice(&body)?;
                Ok(response)
            }
            status => Err(CatalogError::ServerError(status)),
        }
    }
}
