//! Static offline data source for UI prototyping.
//!
//! Implements the same data-source traits as the HTTP clients, so the
//! controllers and the renderer run unchanged with no network: a
//! deterministic sinusoidal 24-hour / 7-day snapshot, a fixed candidate
//! list for search, and a fixed AQI.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Local, Timelike};
use std::f64::consts::PI;

use crate::api::{AirQualitySource, ForecastSource, LocationSource};
use crate::error::{ForecastError, GeocodeError};
use crate::model::{
    AirQuality, Coordinates, CurrentConditions, DaySample, ForecastSnapshot, HourSample, Location,
    Unit, c_to_f,
};

const MOCK_AQI: i64 = 48;

/// Offline stand-in for all three remote data sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockSource;

fn mock_cities() -> Vec<Location> {
    let raw: [(&str, &str, &str, f64, f64); 6] = [
        ("1", "Toronto", "CA", 43.6532, -79.3832),
        ("2", "New York", "US", 40.7128, -74.0060),
        ("3", "London", "UK", 51.5074, -0.1278),
        ("4", "Tokyo", "JP", 35.6762, 139.6503),
        ("5", "Sydney", "AU", -33.8688, 151.2093),
        ("6", "Berlin", "DE", 52.52, 13.405),
    ];

    raw.into_iter()
        .map(|(id, name, country, latitude, longitude)| Location {
            id: id.to_string(),
            name: name.to_string(),
            country: country.to_string(),
            admin1: None,
            latitude,
            longitude,
            timezone: None,
        })
        .collect()
}

fn clamp(n: f64, min: f64, max: f64) -> f64 {
    n.max(min).min(max)
}

fn in_unit(celsius: f64, unit: Unit) -> f64 {
    match unit {
        Unit::Celsius => celsius,
        Unit::Fahrenheit => c_to_f(celsius),
    }
}

/// Build the synthetic snapshot: temperatures, humidity and wind follow
/// phase-shifted sine waves over the day, daily highs/lows over the week.
pub fn build_snapshot(unit: Unit) -> ForecastSnapshot {
    let base = Local::now()
        .naive_local()
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .expect("truncating to the hour is always valid");

    let hours: Vec<HourSample> = (0..24)
        .map(|i| {
            let phase = |offset: f64| ((i as f64 + offset) / 24.0) * PI * 2.0;
            let temp_c = 17.0 + 6.0 * ((i as f64 - 7.0) / 24.0 * PI * 2.0).sin();
            let humidity = clamp(45.0 + 20.0 * phase(3.0).sin(), 25.0, 95.0);
            let wind = clamp(8.0 + 4.0 * phase(9.0).sin(), 2.0, 22.0);

            HourSample {
                time: base + ChronoDuration::hours(i),
                temp: Some((in_unit(temp_c, unit) * 10.0).round() / 10.0),
                humidity: Some(humidity.round()),
                wind_speed_kmh: Some(wind.round()),
            }
        })
        .collect();

    let days: Vec<DaySample> = (0..7)
        .map(|i| {
            let max_c = 22.0 + 4.0 * ((i as f64 + 1.0) / 7.0 * PI * 2.0).sin();
            let min_c = max_c - clamp(6.0 + 2.0 * ((i as f64 + 4.0) / 7.0 * PI * 2.0).sin(), 4.0, 8.0);

            DaySample {
                date: base.date() + ChronoDuration::days(i),
                min_temp: in_unit(min_c, unit).round() as i64,
                max_temp: in_unit(max_c, unit).round() as i64,
                uv_index_max: clamp(2.0 + i as f64, 1.0, 10.0),
                weather_code: Some(2),
                sunrise: None,
                sunset: None,
            }
        })
        .collect();

    let first = &hours[0];
    let current = CurrentConditions {
        temp: first.temp,
        feels_like: first.temp,
        humidity: first.humidity,
        wind_speed_kmh: first.wind_speed_kmh,
        weather_code: Some(2),
    };

    ForecastSnapshot {
        timezone: "local".to_string(),
        unit,
        current,
        hours,
        days,
    }
}

#[async_trait]
impl LocationSource for MockSource {
    async fn search(
        &self,
        name: &str,
        count: u8,
        _language: &str,
    ) -> Result<Vec<Location>, GeocodeError> {
        if name.trim().is_empty() {
            return Ok(Vec::new());
        }
        let needle = name.to_lowercase();
        Ok(mock_cities()
            .into_iter()
            .filter(|c| c.label().to_lowercase().contains(&needle))
            .take(count as usize)
            .collect())
    }
}

#[async_trait]
impl ForecastSource for MockSource {
    async fn fetch(
        &self,
        _coordinates: Coordinates,
        unit: Unit,
    ) -> Result<ForecastSnapshot, ForecastError> {
        Ok(build_snapshot(unit))
    }
}

#[async_trait]
impl AirQualitySource for MockSource {
    async fn fetch(&self, _coordinates: Coordinates) -> AirQuality {
        AirQuality::Index(MOCK_AQI)
    }
}
