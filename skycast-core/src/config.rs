use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::api::{air_quality, forecast, geocode};

/// Default debounce quiescence window for search-as-you-type, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 350;

/// Default number of geocode candidates requested per search.
pub const DEFAULT_GEOCODE_COUNT: u8 = 8;

/// Top-level configuration stored on disk.
///
/// Every field has a sensible default, so a missing config file is not an
/// error. Endpoint overrides exist mainly for pointing the clients at a
/// local stand-in server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Geocoding endpoint URL.
    pub geocode_url: String,

    /// Forecast endpoint URL.
    pub forecast_url: String,

    /// Air-quality endpoint URL.
    pub air_quality_url: String,

    /// Debounce window for search input, milliseconds of quiescence.
    /// Consumed by `SearchController::from_config`; the one-shot CLI has no
    /// search-as-you-type loop, so only embedding front ends see this.
    pub debounce_ms: u64,

    /// Number of geocode candidates to request.
    pub geocode_count: u8,

    /// Language for geocode results.
    pub language: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geocode_url: geocode::GEOCODE_URL.to_string(),
            forecast_url: forecast::FORECAST_URL.to_string(),
            air_quality_url: air_quality::AIR_QUALITY_URL.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            geocode_count: DEFAULT_GEOCODE_COUNT,
            language: "en".to_string(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Path to the directory holding persisted UI state (selection, unit).
    pub fn state_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_open_meteo() {
        let cfg = Config::default();
        assert!(cfg.geocode_url.contains("geocoding-api.open-meteo.com"));
        assert!(cfg.forecast_url.contains("api.open-meteo.com"));
        assert!(cfg.air_quality_url.contains("air-quality-api.open-meteo.com"));
        assert_eq!(cfg.debounce_ms, 350);
        assert_eq!(cfg.geocode_count, 8);
        assert_eq!(cfg.language, "en");
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: Config = toml::from_str("debounce_ms = 100").expect("partial config parses");
        assert_eq!(cfg.debounce_ms, 100);
        assert_eq!(cfg.geocode_count, DEFAULT_GEOCODE_COUNT);
        assert!(cfg.geocode_url.contains("open-meteo"));
    }
}
