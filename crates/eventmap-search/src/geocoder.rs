//! Geocoding backends.

use crate::feature::{LocationFeature, PhotonResponse};
use async_trait::async_trait;
use eventmap_core::config::SearchConfig;
use reqwest::{Client, Url};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Geocoding failures. The search pipeline treats all of them as "no
/// results".
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Geocoder request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Geocoder returned status {status}")]
    Status { status: u16 },

    #[error("Failed to decode geocoder response: {reason}")]
    Decode { reason: String },

    #[error("Invalid geocoder endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

/// A place search backend.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Returns at most `limit` normalized features for `query`.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<LocationFeature>, SearchError>;
}

/// Client for a Photon (OpenStreetMap) `/api` endpoint.
#[derive(Debug, Clone)]
pub struct PhotonGeocoder {
    endpoint: String,
    client: Client,
}

impl PhotonGeocoder {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SearchError> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Url::parse(&endpoint).map_err(|e| SearchError::InvalidEndpoint {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { endpoint, client })
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        Self::new(config.geocoder_url.clone(), config.request_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `{endpoint}/?q={query}&limit={limit}` with the query URL-encoded.
    pub fn request_url(&self, query: &str, limit: usize) -> Result<Url, SearchError> {
        let base = format!("{}/", self.endpoint);
        let limit = limit.to_string();
        Url::parse_with_params(&base, &[("q", query), ("limit", limit.as_str())]).map_err(
            |e| SearchError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            },
        )
    }
}

#[async_trait]
impl Geocoder for PhotonGeocoder {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<LocationFeature>, SearchError> {
        let url = self.request_url(query, limit)?;
        debug!(%url, "Geocoding");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(SearchError::Status {
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await?;
        let parsed: PhotonResponse =
            serde_json::from_slice(&body).map_err(|e| SearchError::Decode {
                reason: e.to_string(),
            })?;

        let mut features = parsed.into_features();
        features.truncate(limit);
        debug!(query, results = features.len(), "Geocoding complete");
        Ok(features)
    }
}
