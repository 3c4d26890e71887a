//! Core library for the `skycast` weather dashboard.
//!
//! This crate defines:
//! - The normalized domain model (locations, forecast snapshots, air quality)
//! - HTTP clients for the Open-Meteo geocoding, forecast and air-quality APIs
//! - Debounced search and stale-discarding weather-load controllers
//! - Key-value persistence of the selected location and unit preference
//! - A static mock data source for offline prototyping
//!
//! It is used by `skycast-cli`, but can also be reused by other front ends.

pub mod api;
pub mod config;
pub mod error;
pub mod mock;
pub mod model;
pub mod search;
pub mod store;
pub mod weather;

pub use api::{
    AirQualitySource, ForecastSource, LocationSource, air_quality::AirQualityClient,
    forecast::ForecastClient, geocode::GeocodeClient,
};
pub use config::Config;
pub use error::{ForecastError, GeocodeError};
pub use model::{
    AirQuality, Coordinates, CurrentConditions, DaySample, ForecastSnapshot, HourSample, Location,
    Unit,
};
pub use search::{SearchController, SearchState};
pub use store::{FileStore, KvStore, MemoryStore};
pub use weather::{WeatherController, WeatherState, default_location};
