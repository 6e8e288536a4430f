use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;

use super::endpoints::{NutritionResponse, NUTRITION_PATH};
use super::retry::RetryPolicy;

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("API key not found in environment: {0}")]
    MissingApiKey(String),
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: StatusCode,
        error_body: String,
    },
}

/// Source of nutrition data for a single free-text ingredient query.
///
/// Implementations absorb transport failures: a lookup that cannot be served
/// yields an empty [`NutritionResponse`] instead of an error.
#[async_trait]
pub trait NutritionLookup: Send + Sync {
    async fn fetch_nutrition(&self, query: &str) -> NutritionResponse;
}

/// HTTP client for the lookup proxy's `/api/nutrition` endpoint.
#[derive(Debug, Clone)]
pub struct NutritionClient {
    http: Client,
    endpoint: Url,
    retry: RetryPolicy,
}

impl NutritionClient {
    pub fn new(proxy_base_url: &str, retry: RetryPolicy) -> Result<Self, ApiConnectionError> {
        let raw = format!("{}{}", proxy_base_url.trim_end_matches('/'), NUTRITION_PATH);
        let endpoint = Url::parse(&raw).map_err(|e| ApiConnectionError::InvalidBaseUrl {
            url: proxy_base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            http: Client::new(),
            endpoint,
            retry,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// A single attempt against the proxy. Non-2xx statuses become [`ApiConnectionError::ApiError`].
    pub async fn try_fetch_nutrition(&self, query: &str) -> Result<NutritionResponse, ApiConnectionError> {
        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&[("query", query)])
            .send()
            .await?;

        if response.status().is_success() {
            let body = response.json::<NutritionResponse>().await?;
            Ok(body)
        } else {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            Err(ApiConnectionError::ApiError { status, error_body })
        }
    }
}

#[async_trait]
impl NutritionLookup for NutritionClient {
    async fn fetch_nutrition(&self, query: &str) -> NutritionResponse {
        match self.retry.run(|_| self.try_fetch_nutrition(query)).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(
                    query,
                    attempts = self.retry.max_attempts,
                    error = %e,
                    "lookup failed after all attempts, treating as no data"
                );
                NutritionResponse::empty()
            }
        }
    }
}
