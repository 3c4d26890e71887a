//! Forecast retrieval and normalization.
//!
//! The upstream API has renamed fields over time (`current_weather` /
//! `weathercode` were deprecated in favor of `current` / `weather_code`), so
//! normalization tolerates both shapes with per-field fallback chains instead
//! of version negotiation. Normalization itself is a pure function over the
//! deserialized body and is tested without any network in the loop.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{ForecastSource, REQUEST_TIMEOUT_SECS};
use crate::error::ForecastError;
use crate::model::{
    Coordinates, CurrentConditions, DaySample, ForecastSnapshot, HourSample, Unit, round_half_up,
};

pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

const CURRENT_VARS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,wind_speed_10m,weather_code";
const HOURLY_VARS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m";
const DAILY_VARS: &str =
    "weather_code,temperature_2m_max,temperature_2m_min,uv_index_max,sunrise,sunset";

#[derive(Debug, Clone)]
pub struct ForecastClient {
    http: Client,
    base_url: String,
}

impl ForecastClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_base_url(FORECAST_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Fetch and normalize the forecast for `coordinates`.
    ///
    /// A non-success status is fatal to the snapshot being built; there is no
    /// partial or stale fallback here. Callers that want stale-but-available
    /// behavior keep their previous snapshot themselves.
    pub async fn fetch(
        &self,
        coordinates: Coordinates,
        unit: Unit,
    ) -> Result<ForecastSnapshot, ForecastError> {
        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("current", CURRENT_VARS.to_string()),
                ("hourly", HOURLY_VARS.to_string()),
                ("daily", DAILY_VARS.to_string()),
                ("timezone", "auto".to_string()),
                ("temperature_unit", unit.api_value().to_string()),
                ("wind_speed_unit", "kmh".to_string()),
                ("precipitation_unit", "mm".to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            tracing::debug!("Forecast request returned status {status}");
            return Err(ForecastError::Status(status));
        }

        let body = res.text().await?;
        let raw: RawForecast = serde_json::from_str(&body)?;

        Ok(normalize_forecast(raw, unit))
    }
}

#[async_trait]
impl ForecastSource for ForecastClient {
    async fn fetch(
        &self,
        coordinates: Coordinates,
        unit: Unit,
    ) -> Result<ForecastSnapshot, ForecastError> {
        ForecastClient::fetch(self, coordinates, unit).await
    }
}

/// Raw response body. Both the modern and the legacy current-conditions
/// shapes deserialize into [`RawCurrent`]; the hourly/daily groups are
/// parallel arrays aligned by index with the `time` array.
#[derive(Debug, Deserialize)]
pub(crate) struct RawForecast {
    pub timezone: Option<String>,
    pub current: Option<RawCurrent>,
    pub current_weather: Option<RawCurrent>,
    #[serde(default)]
    pub hourly: RawHourly,
    #[serde(default)]
    pub daily: RawDaily,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawCurrent {
    // Modern `current` field names.
    pub temperature_2m: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub wind_speed_10m: Option<f64>,
    pub weather_code: Option<i64>,
    // Legacy `current_weather` field names.
    pub temperature: Option<f64>,
    pub windspeed: Option<f64>,
    pub weathercode: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawHourly {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub relative_humidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawDaily {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub weather_code: Vec<Option<i64>>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub uv_index_max: Vec<Option<f64>>,
    #[serde(default)]
    pub sunrise: Vec<Option<String>>,
    #[serde(default)]
    pub sunset: Vec<Option<String>>,
}

/// Normalize a raw body into a [`ForecastSnapshot`]. Absent shapes, absent
/// fields and mismatched array lengths all degrade to `None` or defaults,
/// never to an error.
pub(crate) fn normalize_forecast(raw: RawForecast, unit: Unit) -> ForecastSnapshot {
    let cur = raw.current.or(raw.current_weather).unwrap_or_default();

    let current = CurrentConditions {
        temp: cur.temperature_2m.or(cur.temperature),
        feels_like: cur.apparent_temperature.or(cur.temperature_2m),
        humidity: cur.relative_humidity_2m,
        wind_speed_kmh: cur.wind_speed_10m.or(cur.windspeed),
        weather_code: cur.weather_code.or(cur.weathercode),
    };

    let hourly = raw.hourly;
    let hours = hourly
        .time
        .iter()
        .enumerate()
        .filter_map(|(i, iso)| {
            Some(HourSample {
                time: parse_hour(iso)?,
                temp: value_at(&hourly.temperature_2m, i),
                humidity: value_at(&hourly.relative_humidity_2m, i),
                wind_speed_kmh: value_at(&hourly.wind_speed_10m, i),
            })
        })
        .collect();

    let daily = raw.daily;
    let days = daily
        .time
        .iter()
        .enumerate()
        .filter_map(|(i, iso)| {
            Some(DaySample {
                date: NaiveDate::parse_from_str(iso, "%Y-%m-%d").ok()?,
                min_temp: round_temp(value_at(&daily.temperature_2m_min, i)),
                max_temp: round_temp(value_at(&daily.temperature_2m_max, i)),
                uv_index_max: value_at(&daily.uv_index_max, i).unwrap_or(0.0),
                weather_code: value_at(&daily.weather_code, i),
                // Opaque provider-local time strings; not reparsed.
                sunrise: daily.sunrise.get(i).cloned().flatten(),
                sunset: daily.sunset.get(i).cloned().flatten(),
            })
        })
        .collect();

    ForecastSnapshot {
        timezone: raw.timezone.unwrap_or_else(|| "local".to_string()),
        unit,
        current,
        hours,
        days,
    }
}

/// Index into a parallel upstream array; out-of-range or null entries map to
/// `None`.
fn value_at<T: Clone>(values: &[Option<T>], i: usize) -> Option<T> {
    values.get(i).cloned().flatten()
}

fn round_temp(value: Option<f64>) -> i64 {
    value.map(round_half_up).unwrap_or(0)
}

fn parse_hour(iso: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}
