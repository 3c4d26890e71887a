//! Terminal rendering of a weather state. The snapshot itself is never
//! truncated; only the display slices to the next 24 hours / 7 days.

use skycast_core::model::wmo_label;
use skycast_core::{AirQuality, ForecastSnapshot, Location, Unit, WeatherState};

const HOURS_SHOWN: usize = 24;
const DAYS_SHOWN: usize = 7;

pub fn render(state: &WeatherState) {
    match &state.snapshot {
        Some(snapshot) => {
            if state.error {
                println!("(showing previous data: the latest load failed)\n");
            }
            render_snapshot(&state.selected, snapshot, state.air_quality);
        }
        None => {
            if state.error {
                println!("Failed to load weather data.");
            } else {
                println!("No weather data loaded yet.");
            }
        }
    }
}

fn render_snapshot(location: &Location, snapshot: &ForecastSnapshot, aqi: AirQuality) {
    let degree = match snapshot.unit {
        Unit::Celsius => "°C",
        Unit::Fahrenheit => "°F",
    };

    println!("{} — {}", location.label(), snapshot.timezone);

    let current = &snapshot.current;
    let condition = current.weather_code.map(wmo_label).unwrap_or("-");
    println!(
        "  Now: {} (feels {}) · {} · humidity {} · wind {}",
        fmt_opt(current.temp, degree),
        fmt_opt(current.feels_like, degree),
        condition,
        fmt_opt(current.humidity, "%"),
        fmt_opt(current.wind_speed_kmh, " km/h"),
    );
    match aqi {
        AirQuality::Index(value) => println!("  Air quality (US AQI): {value}"),
        AirQuality::Unknown => println!("  Air quality (US AQI): unknown"),
    }

    if !snapshot.hours.is_empty() {
        println!("\nNext {HOURS_SHOWN} hours:");
        for hour in snapshot.hours.iter().take(HOURS_SHOWN) {
            println!(
                "  {}  {:>8}  {:>5}  {:>10}",
                hour.time.format("%a %H:%M"),
                fmt_opt(hour.temp, degree),
                fmt_opt(hour.humidity, "%"),
                fmt_opt(hour.wind_speed_kmh, " km/h"),
            );
        }
    }

    if !snapshot.days.is_empty() {
        println!("\nNext {DAYS_SHOWN} days:");
        for day in snapshot.days.iter().take(DAYS_SHOWN) {
            let condition = day.weather_code.map(wmo_label).unwrap_or("-");
            print!(
                "  {}  {:>4} / {:<4}  {:<14} UV {:>4.1}",
                day.date.format("%a %b %d"),
                format!("{}°", day.min_temp),
                format!("{}°", day.max_temp),
                condition,
                day.uv_index_max,
            );
            if let (Some(sunrise), Some(sunset)) = (&day.sunrise, &day.sunset) {
                print!("  ↑{} ↓{}", clock_part(sunrise), clock_part(sunset));
            }
            println!();
        }
    }
}

pub fn render_candidates(candidates: &[Location]) {
    for (i, candidate) in candidates.iter().enumerate() {
        let timezone = candidate.timezone.as_deref().unwrap_or("-");
        println!(
            "{:>2}. {}  ({:.4}, {:.4})  {}",
            i + 1,
            candidate.label(),
            candidate.latitude,
            candidate.longitude,
            timezone,
        );
    }
}

fn fmt_opt(value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(v) => format!("{v}{suffix}"),
        None => "-".to_string(),
    }
}

/// Sunrise/sunset arrive as opaque provider-local strings like
/// "2024-06-01T05:38"; show just the clock part when one is present.
fn clock_part(timestamp: &str) -> &str {
    timestamp.split('T').nth(1).unwrap_or(timestamp)
}
