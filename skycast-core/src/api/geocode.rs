//! Forward geocoding: convert a free-text place name to ranked candidates.
//! Uses the Open-Meteo geocoding API - free, no API key required.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{LocationSource, REQUEST_TIMEOUT_SECS};
use crate::error::GeocodeError;
use crate::model::Location;

pub const GEOCODE_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

#[derive(Debug, Clone)]
pub struct GeocodeClient {
    http: Client,
    base_url: String,
}

impl GeocodeClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_base_url(GEOCODE_URL.to_string())
    }

    /// Build a client against a non-default endpoint, e.g. a local test server.
    pub fn with_base_url(base_url: String) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Search for places matching `name`.
    ///
    /// An empty or whitespace-only `name` short-circuits to an empty list
    /// without touching the network; that is documented behavior, not an
    /// error. An absent upstream `results` field is treated as empty.
    pub async fn search(
        &self,
        name: &str,
        count: u8,
        language: &str,
    ) -> Result<Vec<Location>, GeocodeError> {
        if name.trim().is_empty() {
            return Ok(Vec::new());
        }

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("name", name.to_string()),
                ("count", count.to_string()),
                ("language", language.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            tracing::debug!("Geocode request returned status {status}");
            return Err(GeocodeError::Status(status));
        }

        let body = res.text().await?;
        let parsed: GeoResponse = serde_json::from_str(&body)?;

        let locations = parsed
            .results
            .unwrap_or_default()
            .into_iter()
            .map(Location::from)
            .collect();

        Ok(locations)
    }
}

#[async_trait]
impl LocationSource for GeocodeClient {
    async fn search(
        &self,
        name: &str,
        count: u8,
        language: &str,
    ) -> Result<Vec<Location>, GeocodeError> {
        GeocodeClient::search(self, name, count, language).await
    }
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    results: Option<Vec<GeoResult>>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    id: i64,
    name: String,
    country: Option<String>,
    admin1: Option<String>,
    latitude: f64,
    longitude: f64,
    timezone: Option<String>,
}

impl From<GeoResult> for Location {
    fn from(r: GeoResult) -> Self {
        Location {
            // Numeric upstream id, stringified so the UI layer can compare
            // ids without caring about the provider's representation.
            id: r.id.to_string(),
            name: r.name,
            country: r.country.unwrap_or_default(),
            admin1: r.admin1,
            latitude: r.latitude,
            longitude: r.longitude,
            timezone: r.timezone,
        }
    }
}
