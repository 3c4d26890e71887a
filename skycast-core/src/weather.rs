//! Weather loading for the selected location: forecast and air quality are
//! fetched concurrently, stale loads are discarded by generation, and the
//! selection plus unit preference survive restarts through the key-value
//! store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::api::{AirQualitySource, ForecastSource};
use crate::model::{AirQuality, ForecastSnapshot, Location, Unit};
use crate::store::KvStore;

/// Store key for the JSON-encoded selected [`Location`].
pub const SELECTED_KEY: &str = "selected";
/// Store key for the `"C"` / `"F"` unit preference.
pub const UNIT_KEY: &str = "unit";

/// Fallback when nothing was persisted yet or the persisted blob fails to
/// deserialize.
pub fn default_location() -> Location {
    Location {
        id: "6167865".to_string(),
        name: "Toronto".to_string(),
        country: "CA".to_string(),
        admin1: None,
        latitude: 43.6532,
        longitude: -79.3832,
        timezone: Some("America/Toronto".to_string()),
    }
}

/// Observable load state handed to the presentation layer.
#[derive(Debug, Clone)]
pub struct WeatherState {
    pub selected: Location,
    pub unit: Unit,
    pub snapshot: Option<ForecastSnapshot>,
    pub air_quality: AirQuality,
    pub loading: bool,
    /// Set when the most recent forecast load failed. The previous snapshot,
    /// if any, stays in place (stale-but-available).
    pub error: bool,
}

pub struct WeatherController {
    forecast: Arc<dyn ForecastSource>,
    air: Arc<dyn AirQualitySource>,
    store: Arc<dyn KvStore>,
    generation: Arc<AtomicU64>,
    state: Arc<Mutex<WeatherState>>,
}

impl WeatherController {
    /// Build a controller, restoring the persisted selection and unit. A
    /// missing or undecodable persisted location falls back to the default
    /// location and Celsius.
    pub fn new(
        forecast: Arc<dyn ForecastSource>,
        air: Arc<dyn AirQualitySource>,
        store: Arc<dyn KvStore>,
    ) -> Self {
        let selected = store
            .get(SELECTED_KEY)
            .and_then(|blob| serde_json::from_str(&blob).ok())
            .unwrap_or_else(default_location);
        let unit = store
            .get(UNIT_KEY)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        Self {
            forecast,
            air,
            store,
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(Mutex::new(WeatherState {
                selected,
                unit,
                snapshot: None,
                air_quality: AirQuality::Unknown,
                loading: false,
                error: false,
            })),
        }
    }

    pub fn state(&self) -> WeatherState {
        self.state.lock().expect("weather state lock poisoned").clone()
    }

    /// Change the selected location and reload.
    pub async fn select(&self, location: Location) {
        {
            let mut state = self.state.lock().expect("weather state lock poisoned");
            state.selected = location;
        }
        self.persist();
        self.refresh().await;
    }

    /// Set the unit preference without triggering a load. Useful before the
    /// first load, e.g. when a command-line flag overrides the persisted
    /// preference.
    pub fn override_unit(&self, unit: Unit) {
        {
            let mut state = self.state.lock().expect("weather state lock poisoned");
            state.unit = unit;
        }
        self.persist();
    }

    /// Change the unit preference and reload.
    pub async fn set_unit(&self, unit: Unit) {
        {
            let mut state = self.state.lock().expect("weather state lock poisoned");
            state.unit = unit;
        }
        self.persist();
        self.refresh().await;
    }

    /// Run one load for the current selection. Forecast and air quality are
    /// issued without an ordering dependency between their completions; the
    /// non-critical air-quality path never delays or fails the forecast.
    /// If a newer load started meanwhile, this one's results are discarded.
    pub async fn refresh(&self) {
        let captured = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let (coordinates, unit) = {
            let mut state = self.state.lock().expect("weather state lock poisoned");
            state.loading = true;
            (state.selected.coordinates(), state.unit)
        };

        let (forecast, air_quality) =
            tokio::join!(self.forecast.fetch(coordinates, unit), self.air.fetch(coordinates));

        if self.generation.load(Ordering::SeqCst) != captured {
            tracing::debug!("Discarding stale weather load (generation {captured})");
            return;
        }

        let mut state = self.state.lock().expect("weather state lock poisoned");
        state.loading = false;
        state.air_quality = air_quality;
        match forecast {
            Ok(snapshot) => {
                state.snapshot = Some(snapshot);
                state.error = false;
            }
            Err(e) => {
                // Previous snapshot stays visible; no automatic retry.
                tracing::warn!("Forecast load failed: {e}");
                state.error = true;
            }
        }
    }

    fn persist(&self) {
        let (selected, unit) = {
            let state = self.state.lock().expect("weather state lock poisoned");
            (state.selected.clone(), state.unit)
        };

        match serde_json::to_string(&selected) {
            Ok(blob) => self.store.set(SELECTED_KEY, &blob),
            Err(e) => tracing::warn!("Failed to serialize selected location: {e}"),
        }
        self.store.set(UNIT_KEY, unit.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForecastError;
    use crate::model::{Coordinates, CurrentConditions};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::atomic::AtomicBool;

    /// Forecast source that can be flipped between success and failure.
    struct SwitchableForecast {
        fail: AtomicBool,
    }

    impl SwitchableForecast {
        fn ok() -> Self {
            Self { fail: AtomicBool::new(false) }
        }
    }

    #[async_trait]
    impl ForecastSource for SwitchableForecast {
        async fn fetch(
            &self,
            _coordinates: Coordinates,
            unit: Unit,
        ) -> Result<ForecastSnapshot, ForecastError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ForecastError::Status(StatusCode::INTERNAL_SERVER_ERROR));
            }
            Ok(ForecastSnapshot {
                timezone: "America/Toronto".to_string(),
                unit,
                current: CurrentConditions { temp: Some(18.0), ..Default::default() },
                hours: Vec::new(),
                days: Vec::new(),
            })
        }
    }

    struct FixedAir(AirQuality);

    #[async_trait]
    impl AirQualitySource for FixedAir {
        async fn fetch(&self, _coordinates: Coordinates) -> AirQuality {
            self.0
        }
    }

    fn controller_with(
        forecast: Arc<SwitchableForecast>,
        store: Arc<MemoryStore>,
    ) -> WeatherController {
        WeatherController::new(forecast, Arc::new(FixedAir(AirQuality::Index(48))), store)
    }

    #[tokio::test]
    async fn forecast_failure_keeps_previous_snapshot_and_sets_error() {
        let forecast = Arc::new(SwitchableForecast::ok());
        let controller = controller_with(Arc::clone(&forecast), Arc::new(MemoryStore::new()));

        controller.select(default_location()).await;
        let state = controller.state();
        assert!(state.snapshot.is_some());
        assert!(!state.error);

        forecast.fail.store(true, Ordering::SeqCst);
        controller.set_unit(Unit::Fahrenheit).await;

        let state = controller.state();
        assert!(state.error, "failed load must raise the error flag");
        let snapshot = state.snapshot.expect("previous snapshot must survive the failure");
        assert_eq!(snapshot.current.temp, Some(18.0));
    }

    #[tokio::test]
    async fn air_quality_applies_independently_of_forecast_failure() {
        let forecast = Arc::new(SwitchableForecast::ok());
        forecast.fail.store(true, Ordering::SeqCst);
        let controller = controller_with(forecast, Arc::new(MemoryStore::new()));

        controller.refresh().await;

        let state = controller.state();
        assert!(state.error);
        assert_eq!(state.air_quality, AirQuality::Index(48));
    }

    #[tokio::test]
    async fn selection_and_unit_are_persisted_and_restored() {
        let store = Arc::new(MemoryStore::new());
        let forecast = Arc::new(SwitchableForecast::ok());

        {
            let controller = controller_with(Arc::clone(&forecast), Arc::clone(&store));
            let mut berlin = default_location();
            berlin.id = "2950159".to_string();
            berlin.name = "Berlin".to_string();
            berlin.country = "DE".to_string();
            controller.select(berlin).await;
            controller.set_unit(Unit::Fahrenheit).await;
        }

        let restored = controller_with(forecast, store);
        let state = restored.state();
        assert_eq!(state.selected.name, "Berlin");
        assert_eq!(state.unit, Unit::Fahrenheit);
    }

    #[tokio::test]
    async fn corrupt_persisted_location_falls_back_to_default() {
        let store = Arc::new(MemoryStore::new());
        store.set("selected", "{not json");
        store.set("unit", "parsecs");

        let controller = controller_with(Arc::new(SwitchableForecast::ok()), store);
        let state = controller.state();
        assert_eq!(state.selected.name, "Toronto");
        assert_eq!(state.unit, Unit::Celsius);
    }

    /// Forecast source that answers slowly in Celsius and quickly in
    /// Fahrenheit, so a superseded load resolves after its successor.
    struct UnitPacedForecast;

    #[async_trait]
    impl ForecastSource for UnitPacedForecast {
        async fn fetch(
            &self,
            _coordinates: Coordinates,
            unit: Unit,
        ) -> Result<ForecastSnapshot, ForecastError> {
            let (delay_ms, temp) = match unit {
                Unit::Celsius => (100, 1.0),
                Unit::Fahrenheit => (5, 2.0),
            };
            tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
            Ok(ForecastSnapshot {
                timezone: "America/Toronto".to_string(),
                unit,
                current: CurrentConditions { temp: Some(temp), ..Default::default() },
                hours: Vec::new(),
                days: Vec::new(),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stale_load_is_discarded_by_generation() {
        let controller = Arc::new(WeatherController::new(
            Arc::new(UnitPacedForecast),
            Arc::new(FixedAir(AirQuality::Index(48))),
            Arc::new(MemoryStore::new()),
        ));

        // Slow Celsius load starts first, fast Fahrenheit load supersedes it.
        let slow = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.refresh().await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        controller.set_unit(Unit::Fahrenheit).await;
        slow.await.expect("slow load finishes");

        let state = controller.state();
        let snapshot = state.snapshot.expect("snapshot applied");
        assert_eq!(snapshot.unit, Unit::Fahrenheit);
        assert_eq!(snapshot.current.temp, Some(2.0), "late stale result must be discarded");
    }
}
