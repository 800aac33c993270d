//! Distance Matrix HTTP client.
//!
//! Sends one origin/destination pair per request and classifies the answer.
//! The API key travels as a query parameter, so URLs are never logged and
//! transport errors are stripped of them before being recorded.

use std::time::Duration;

use crate::domain::{ResolvedQuery, TripOutcome};

use super::TripRouter;
use super::convert::classify_response;
use super::error::MapsError;
use super::types::DistanceMatrixResponse;

/// Default endpoint for the Distance Matrix API.
const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/distancematrix/json";

/// Default language for duration and distance texts.
const DEFAULT_LANGUAGE: &str = "fr";

/// Traffic model requested for traffic-aware driving queries.
const TRAFFIC_MODEL: &str = "best_guess";

/// Configuration for the routing client.
#[derive(Clone)]
pub struct MapsConfig {
    /// API key, sent with every request
    pub api_key: String,
    /// Endpoint URL (defaults to the production Distance Matrix API)
    pub base_url: String,
    /// Language of the returned texts
    pub language: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl MapsConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom endpoint URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the language of duration and distance texts.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl std::fmt::Debug for MapsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapsConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Distance Matrix API client.
#[derive(Clone)]
pub struct MapsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl MapsClient {
    /// Create a new client with the given configuration.
    pub fn new(config: MapsConfig) -> Result<Self, MapsError> {
        if config.api_key.trim().is_empty() {
            return Err(MapsError::Config("API key is empty".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            api_key: config.api_key,
            language: config.language,
        })
    }

    /// Query travel time and distance for one trip.
    ///
    /// Exactly one request is sent; there are no retries.
    pub async fn distance_matrix(
        &self,
        query: &ResolvedQuery,
    ) -> Result<DistanceMatrixResponse, MapsError> {
        let params = query_params(query, &self.language);

        tracing::debug!(
            mode = %query.mode,
            traffic = query.use_traffic_model,
            departure = ?query.departure,
            "requesting distance matrix"
        );

        let response = self
            .http
            .get(&self.base_url)
            .query(&params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MapsError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| MapsError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

impl std::fmt::Debug for MapsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapsClient")
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl TripRouter for MapsClient {
    async fn route(&self, query: &ResolvedQuery) -> TripOutcome {
        match self.distance_matrix(query).await {
            Ok(response) => classify_response(&response),
            Err(e) => {
                tracing::warn!(error = %e, "distance matrix request failed");
                TripOutcome::transport_error(e.to_string())
            }
        }
    }
}

/// Query parameters for a trip, excluding the API key.
fn query_params(query: &ResolvedQuery, language: &str) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("origins", query.origin.clone()),
        ("destinations", query.destination.clone()),
        ("mode", query.mode.as_api_str().to_string()),
        ("language", language.to_string()),
    ];

    if let Some(departure) = query.departure {
        params.push(("departure_time", departure.timestamp().to_string()));
        if query.use_traffic_model {
            params.push(("traffic_model", TRAFFIC_MODEL.to_string()));
        }
    }

    params
}
