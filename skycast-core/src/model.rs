use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A geocoded place candidate.
///
/// `id` is the upstream numeric id coerced to a string so it stays stably
/// comparable across the UI layer. Ids are provider-assigned and not
/// guaranteed unique across providers; `(latitude, longitude)` is the
/// practical dedup key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub country: String,
    pub admin1: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Option<String>,
}

impl Location {
    /// Display label, e.g. "Toronto, Ontario, CA".
    pub fn label(&self) -> String {
        match &self.admin1 {
            Some(admin1) => format!("{}, {}, {}", self.name, admin1, self.country),
            None => format!("{}, {}", self.name, self.country),
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates { latitude: self.latitude, longitude: self.longitude }
    }
}

/// Plain latitude/longitude pair handed to the forecast and air-quality clients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Temperature unit preference, persisted as `"C"` / `"F"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Celsius => "C",
            Unit::Fahrenheit => "F",
        }
    }

    /// Value of the upstream `temperature_unit` query parameter.
    pub fn api_value(&self) -> &'static str {
        match self {
            Unit::Celsius => "celsius",
            Unit::Fahrenheit => "fahrenheit",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "c" | "celsius" => Ok(Unit::Celsius),
            "f" | "fahrenheit" => Ok(Unit::Fahrenheit),
            _ => Err(anyhow::anyhow!("Unknown unit '{s}'. Supported units: C, F.")),
        }
    }
}

/// Fully normalized forecast for one location.
///
/// `hours` and `days` are ordered ascending by time and carry everything the
/// upstream returned; display layers slice to the next 24 hours / 7 days.
/// A snapshot is rebuilt in full on every fetch and replaces any prior one.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSnapshot {
    pub timezone: String,
    pub unit: Unit,
    pub current: CurrentConditions,
    pub hours: Vec<HourSample>,
    pub days: Vec<DaySample>,
}

/// Current conditions. Every field is optional because the upstream may
/// answer with either the `current` or the legacy `current_weather` shape,
/// or omit fields entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentConditions {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub weather_code: Option<i64>,
}

/// One hourly sample, positionally zipped from the upstream parallel arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct HourSample {
    pub time: NaiveDateTime,
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
}

/// One daily sample. Sunrise/sunset stay opaque upstream strings because
/// their timezone semantics are provider-local.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySample {
    pub date: NaiveDate,
    pub min_temp: i64,
    pub max_temp: i64,
    pub uv_index_max: f64,
    pub weather_code: Option<i64>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

/// Most recent US AQI reading, or Unknown when the air-quality path degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AirQuality {
    Index(i64),
    #[default]
    Unknown,
}

impl AirQuality {
    pub fn is_known(&self) -> bool {
        matches!(self, AirQuality::Index(_))
    }
}

impl fmt::Display for AirQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AirQuality::Index(value) => write!(f, "{value}"),
            AirQuality::Unknown => f.write_str("unknown"),
        }
    }
}

/// Human label for a WMO weather code.
/// See <https://open-meteo.com/en/docs#weathervariables>.
pub fn wmo_label(code: i64) -> &'static str {
    match code {
        0 => "Clear",
        1 => "Mainly Clear",
        2 => "Partly Cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Rime Fog",
        51 => "Light Drizzle",
        53 => "Drizzle",
        55 => "Heavy Drizzle",
        61 => "Light Rain",
        63 => "Rain",
        65 => "Heavy Rain",
        71 => "Light Snow",
        73 => "Snow",
        75 => "Heavy Snow",
        80 => "Rain Showers",
        95 => "Thunderstorm",
        _ => "Partly Cloudy",
    }
}

/// Convert Celsius to Fahrenheit.
pub fn c_to_f(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Round to the nearest integer with halves rounding up, so `-10.5` gives
/// `-10` and `-0.5` gives `0`. `f64::round` rounds halves away from zero
/// instead, which diverges on negative values.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_roundtrips_through_str() {
        for unit in [Unit::Celsius, Unit::Fahrenheit] {
            let parsed: Unit = unit.as_str().parse().expect("roundtrip should succeed");
            assert_eq!(unit, parsed);
        }
    }

    #[test]
    fn unit_parse_accepts_long_names() {
        assert_eq!("celsius".parse::<Unit>().unwrap(), Unit::Celsius);
        assert_eq!("Fahrenheit".parse::<Unit>().unwrap(), Unit::Fahrenheit);
    }

    #[test]
    fn unit_parse_rejects_unknown() {
        let err = "kelvin".parse::<Unit>().unwrap_err();
        assert!(err.to_string().contains("Unknown unit"));
    }

    #[test]
    fn unit_serializes_as_single_letter() {
        assert_eq!(serde_json::to_string(&Unit::Celsius).unwrap(), "\"C\"");
        assert_eq!(serde_json::from_str::<Unit>("\"F\"").unwrap(), Unit::Fahrenheit);
    }

    #[test]
    fn location_label_includes_admin1_when_present() {
        let mut loc = Location {
            id: "1".into(),
            name: "Toronto".into(),
            country: "CA".into(),
            admin1: Some("Ontario".into()),
            latitude: 43.6532,
            longitude: -79.3832,
            timezone: None,
        };
        assert_eq!(loc.label(), "Toronto, Ontario, CA");

        loc.admin1 = None;
        assert_eq!(loc.label(), "Toronto, CA");
    }

    #[test]
    fn wmo_label_falls_back_for_unknown_codes() {
        assert_eq!(wmo_label(0), "Clear");
        assert_eq!(wmo_label(95), "Thunderstorm");
        assert_eq!(wmo_label(42), "Partly Cloudy");
    }

    #[test]
    fn c_to_f_known_points() {
        assert_eq!(c_to_f(0.0), 32.0);
        assert_eq!(c_to_f(100.0), 212.0);
    }

    #[test]
    fn round_half_up_at_the_halfway_point() {
        assert_eq!(round_half_up(10.4), 10);
        assert_eq!(round_half_up(20.6), 21);
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-10.5), -10);
        assert_eq!(round_half_up(-0.5), 0);
        assert_eq!(round_half_up(-0.6), -1);
    }
}
