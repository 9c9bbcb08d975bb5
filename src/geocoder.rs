//! Geocoding capability and its HTTP implementation.

use crate::credentials::ApiKey;
use crate::error::{Error, Result};
use crate::types::{GeocodeResult, GeocodeStatus};
use serde::Deserialize;
use std::time::Duration;

/// Default Google Geocoding API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Single-query geocoding capability.
///
/// Implementations answer one free-text query with a status and, on
/// success, the location of the first result. Transport faults are
/// returned as errors rather than folded into a status.
#[async_trait::async_trait]
pub trait Geocoder {
    /// Geocode one candidate address.
    async fn geocode(&self, address: &str) -> Result<GeocodeResult>;
}

/// Configuration for the HTTP geocoder.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Endpoint queried with `address` and `key` parameters
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Skip TLS certificate verification (self-signed proxies in the chain)
    pub accept_invalid_certs: bool,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            accept_invalid_certs: true,
        }
    }
}

/// Geocoder backed by the Google Geocoding JSON API.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: ApiKey,
}

impl GoogleGeocoder {
    /// Build a geocoder with its own HTTP session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &GeocoderConfig, api_key: ApiKey) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(Error::config_error("geocoder base URL is empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| Error::config_error(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key,
        })
    }

    /// Endpoint this geocoder queries.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeocodeResult> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("address", address), ("key", self.api_key.expose())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::http_error(
                format!("geocoding request failed with status {status}"),
                Some(status.as_u16()),
            ));
        }

        let body = response.text().await?;
        let parsed: GeocodeResponse = serde_json::from_str(&body)?;
        Ok(parsed.into_result())
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: Option<String>,
    #[serde(default)]
    results: Vec<ResultEntry>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultEntry {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

impl GeocodeResponse {
    fn into_result(self) -> GeocodeResult {
        let status = GeocodeStatus::from_code(self.status.as_deref().unwrap_or("UNKNOWN"));

        if let Some(message) = &self.error_message {
            tracing::warn!(%status, "geocoding service says: {message}");
        }

        if status != GeocodeStatus::Ok {
            return GeocodeResult::status_only(status);
        }

        match self.results.into_iter().next() {
            Some(first) => {
                GeocodeResult::found(first.geometry.location.lat, first.geometry.location.lng)
            }
            None => GeocodeResult::status_only(status),
        }
    }
}
