//! HTTP clients for the Open-Meteo family of endpoints, plus the data-source
//! traits the controllers are written against.

use crate::error::{ForecastError, GeocodeError};
use crate::model::{AirQuality, Coordinates, ForecastSnapshot, Location, Unit};
use async_trait::async_trait;

pub mod air_quality;
pub mod forecast;
pub mod geocode;

/// Timeout applied to every built HTTP client.
pub(crate) const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Resolves a free-text place name to ranked location candidates.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn search(
        &self,
        name: &str,
        count: u8,
        language: &str,
    ) -> Result<Vec<Location>, GeocodeError>;
}

/// Fetches and normalizes a forecast for a coordinate pair.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch(
        &self,
        coordinates: Coordinates,
        unit: Unit,
    ) -> Result<ForecastSnapshot, ForecastError>;
}

/// Fetches the most recent air-quality reading. Infallible at the interface:
/// every failure degrades to [`AirQuality::Unknown`].
#[async_trait]
pub trait AirQualitySource: Send + Sync {
    async fn fetch(&self, coordinates: Coordinates) -> AirQuality;
}
