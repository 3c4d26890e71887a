//! Air-quality lookup. This path is non-critical by design: every failure,
//! transport-level or shape-level, degrades to [`AirQuality::Unknown`]
//! instead of reaching the caller as an error.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{AirQualitySource, REQUEST_TIMEOUT_SECS};
use crate::model::{AirQuality, Coordinates, round_half_up};

pub const AIR_QUALITY_URL: &str = "https://air-quality-api.open-meteo.com/v1/air-quality";

#[derive(Debug, Clone)]
pub struct AirQualityClient {
    http: Client,
    base_url: String,
}

impl AirQualityClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_base_url(AIR_QUALITY_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Fetch the most recent US AQI reading for `coordinates`.
    ///
    /// The last entry of the hourly `us_aqi` array is taken as "most recent",
    /// trusting the upstream's chronological ordering; the array is not
    /// re-sorted here.
    pub async fn fetch(&self, coordinates: Coordinates) -> AirQuality {
        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("hourly", "us_aqi,pm2_5".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await;

        let res = match res {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Air-quality request failed: {e}");
                return AirQuality::Unknown;
            }
        };

        if !res.status().is_success() {
            tracing::debug!("Air-quality request returned status {}", res.status());
            return AirQuality::Unknown;
        }

        let body: AirResponse = match res.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Air-quality parse error: {e}");
                return AirQuality::Unknown;
            }
        };

        latest_reading(&body)
    }
}

#[async_trait]
impl AirQualitySource for AirQualityClient {
    async fn fetch(&self, coordinates: Coordinates) -> AirQuality {
        AirQualityClient::fetch(self, coordinates).await
    }
}

#[derive(Debug, Default, Deserialize)]
struct AirResponse {
    #[serde(default)]
    hourly: AirHourly,
}

#[derive(Debug, Default, Deserialize)]
struct AirHourly {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    us_aqi: Vec<Option<f64>>,
}

fn latest_reading(body: &AirResponse) -> AirQuality {
    if body.hourly.time.is_empty() {
        return AirQuality::Unknown;
    }

    match body.hourly.us_aqi.last().copied().flatten() {
        Some(value) => AirQuality::Index(round_half_up(value)),
        None => AirQuality::Unknown,
    }
}
