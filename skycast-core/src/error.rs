use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a geocoding request. SearchController recovers from any of
/// these by showing an empty result list.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geocoding request returned status {0}")]
    Status(StatusCode),

    #[error("failed to parse geocoding response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure of a forecast request. Fatal to the snapshot being built; the
/// caller may keep showing a previous snapshot.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("forecast request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("forecast request returned status {0}")]
    Status(StatusCode),

    #[error("failed to parse forecast response: {0}")]
    Parse(#[from] serde_json::Error),
}
