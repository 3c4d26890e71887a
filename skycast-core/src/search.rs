//! Debounced, race-free search-as-you-type over a [`LocationSource`].
//!
//! Each keystroke resets a scheduled timer; only after the quiescence window
//! does a search actually fire. Each firing bumps a generation counter and
//! captures it, and a result is applied only if the captured generation is
//! still the live one when it arrives. Network latency is unbounded, so
//! last-writer-wins must be decided by generation, not by arrival order.
//! Superseded requests are not aborted at the transport level; their results
//! are discarded after resolution.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::api::LocationSource;
use crate::config::{Config, DEFAULT_DEBOUNCE_MS, DEFAULT_GEOCODE_COUNT};
use crate::model::Location;

/// Observable search state.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub searching: bool,
    pub results: Vec<Location>,
}

pub struct SearchController {
    source: Arc<dyn LocationSource>,
    debounce: Duration,
    count: u8,
    language: String,
    generation: Arc<AtomicU64>,
    state: Arc<Mutex<SearchState>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl SearchController {
    pub fn new(source: Arc<dyn LocationSource>) -> Self {
        Self::with_debounce(source, Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }

    /// Build a controller with the debounce window, candidate count and
    /// result language from a [`Config`].
    pub fn from_config(source: Arc<dyn LocationSource>, config: &Config) -> Self {
        Self::with_debounce(source, Duration::from_millis(config.debounce_ms))
            .count(config.geocode_count)
            .language(config.language.clone())
    }

    pub fn with_debounce(source: Arc<dyn LocationSource>, debounce: Duration) -> Self {
        Self {
            source,
            debounce,
            count: DEFAULT_GEOCODE_COUNT,
            language: "en".to_string(),
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(Mutex::new(SearchState::default())),
            pending: Mutex::new(None),
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn count(mut self, count: u8) -> Self {
        self.count = count;
        self
    }

    /// Snapshot of the current search state.
    pub fn state(&self) -> SearchState {
        self.state.lock().expect("search state lock poisoned").clone()
    }

    /// Feed one input change. Resets the debounce timer; empty input clears
    /// results immediately and invalidates anything still in flight.
    pub fn on_input(&self, text: impl Into<String>) {
        let text = text.into();

        let mut pending = self.pending.lock().expect("pending lock poisoned");
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        if text.trim().is_empty() {
            self.generation.fetch_add(1, Ordering::SeqCst);
            let mut state = self.state.lock().expect("search state lock poisoned");
            state.searching = false;
            state.results.clear();
            return;
        }

        let source = Arc::clone(&self.source);
        let generation = Arc::clone(&self.generation);
        let state = Arc::clone(&self.state);
        let debounce = self.debounce;
        let count = self.count;
        let language = self.language.clone();

        // The abortable task is only the debounce timer. Once it fires, the
        // search itself runs detached: an in-flight request is never aborted
        // at the transport level, its result is discarded by generation
        // check after resolution.
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            let captured = generation.fetch_add(1, Ordering::SeqCst) + 1;
            {
                let mut state = state.lock().expect("search state lock poisoned");
                state.searching = true;
            }

            tokio::spawn(async move {
                // Any geocode failure shows as "no results", never as an error.
                let results = source
                    .search(&text, count, &language)
                    .await
                    .unwrap_or_else(|e| {
                        tracing::debug!("Search for {text:?} failed: {e}");
                        Vec::new()
                    });

                if generation.load(Ordering::SeqCst) == captured {
                    let mut state = state.lock().expect("search state lock poisoned");
                    state.searching = false;
                    state.results = results;
                }
            });
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeocodeError;
    use async_trait::async_trait;
    use reqwest::StatusCode;

    fn place(id: &str, name: &str) -> Location {
        Location {
            id: id.to_string(),
            name: name.to_string(),
            country: "CA".to_string(),
            admin1: None,
            latitude: 0.0,
            longitude: 0.0,
            timezone: None,
        }
    }

    /// Fake source whose per-query latency is scripted, so resolution order
    /// can be made independent of request order.
    struct ScriptedSource {
        latencies: Vec<(&'static str, Duration)>,
    }

    #[async_trait]
    impl LocationSource for ScriptedSource {
        async fn search(
            &self,
            name: &str,
            _count: u8,
            _language: &str,
        ) -> Result<Vec<Location>, GeocodeError> {
            let delay = self
                .latencies
                .iter()
                .find(|(q, _)| *q == name)
                .map(|(_, d)| *d)
                .unwrap_or_default();
            tokio::time::sleep(delay).await;
            Ok(vec![place(name, name)])
        }
    }

    struct FailingSource;

    #[async_trait]
    impl LocationSource for FailingSource {
        async fn search(
            &self,
            _name: &str,
            _count: u8,
            _language: &str,
        ) -> Result<Vec<Location>, GeocodeError> {
            Err(GeocodeError::Status(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_stale_response_loses_to_newest_generation() {
        let source = Arc::new(ScriptedSource {
            latencies: vec![
                ("a", Duration::from_millis(500)),
                ("ab", Duration::from_millis(40)),
                ("abc", Duration::from_millis(5)),
            ],
        });
        let controller = SearchController::with_debounce(source, Duration::from_millis(10));

        for query in ["a", "ab", "abc"] {
            controller.on_input(query);
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        // Long enough for "a" to resolve last.
        tokio::time::sleep(Duration::from_millis(700)).await;

        let state = controller.state();
        assert!(!state.searching);
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].name, "abc");
    }

    #[tokio::test(start_paused = true)]
    async fn typing_within_the_debounce_window_fires_once() {
        let source = Arc::new(ScriptedSource { latencies: vec![] });
        let controller = SearchController::with_debounce(source, Duration::from_millis(50));

        controller.on_input("t");
        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.on_input("to");
        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.on_input("tor");

        tokio::time::sleep(Duration::from_millis(200)).await;

        let state = controller.state();
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].name, "tor");
        assert_eq!(controller.generation.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_input_clears_results_without_searching() {
        let source = Arc::new(ScriptedSource { latencies: vec![] });
        let controller = SearchController::with_debounce(source, Duration::from_millis(10));

        controller.on_input("toronto");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(controller.state().results.len(), 1);

        controller.on_input("   ");
        let state = controller.state();
        assert!(state.results.is_empty());
        assert!(!state.searching);
    }

    #[tokio::test(start_paused = true)]
    async fn from_config_applies_search_tuning() {
        let config = Config {
            debounce_ms: 5,
            geocode_count: 3,
            language: "de".to_string(),
            ..Config::default()
        };
        let source = Arc::new(ScriptedSource { latencies: vec![] });
        let controller = SearchController::from_config(source, &config);

        assert_eq!(controller.debounce, Duration::from_millis(5));
        assert_eq!(controller.count, 3);
        assert_eq!(controller.language, "de");

        // The configured window is the one actually honored.
        controller.on_input("berlin");
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(controller.state().results.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn geocode_failure_resolves_to_empty_results() {
        let controller =
            SearchController::with_debounce(Arc::new(FailingSource), Duration::from_millis(10));

        controller.on_input("toronto");
        tokio::time::sleep(Duration::from_millis(100)).await;

        let state = controller.state();
        assert!(!state.searching);
        assert!(state.results.is_empty());
    }
}
