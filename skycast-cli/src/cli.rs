use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::Select;
use std::fmt;
use std::sync::Arc;

use skycast_core::mock::MockSource;
use skycast_core::{
    AirQualityClient, AirQualitySource, Config, FileStore, ForecastClient, ForecastSource,
    GeocodeClient, KvStore, Location, LocationSource, Unit, WeatherController,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather dashboard CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search for locations matching a place name.
    Search {
        /// Place name prefix, e.g. "toronto".
        place: String,
    },

    /// Show current conditions and the hourly/daily forecast.
    Show {
        /// Place name; if absent, the last selected location is used.
        place: Option<String>,

        /// Temperature unit (C or F); overrides the persisted preference.
        #[arg(long)]
        unit: Option<Unit>,

        /// Take the top geocode candidate instead of prompting.
        #[arg(long)]
        first: bool,

        /// Use the built-in offline mock data instead of the network.
        #[arg(long)]
        mock: bool,
    },

    /// Set the persisted temperature unit preference.
    Unit {
        /// "C" or "F"; prompts interactively when absent.
        unit: Option<Unit>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Search { place } => search(&config, &place).await,
            Command::Show { place, unit, first, mock } => {
                show(&config, place, unit, first, mock).await
            }
            Command::Unit { unit } => set_unit(unit),
        }
    }
}

async fn search(config: &Config, place: &str) -> Result<()> {
    let client = GeocodeClient::with_base_url(config.geocode_url.clone())
        .context("Failed to build geocoding client")?;

    let candidates = client
        .search(place, config.geocode_count, &config.language)
        .await
        .context("Geocoding search failed")?;

    if candidates.is_empty() {
        println!("No locations found for {place:?}.");
        return Ok(());
    }

    render::render_candidates(&candidates);
    Ok(())
}

async fn show(
    config: &Config,
    place: Option<String>,
    unit: Option<Unit>,
    first: bool,
    mock: bool,
) -> Result<()> {
    let store: Arc<dyn KvStore> = Arc::new(FileStore::new(&Config::state_dir()?));

    let (geocoder, forecast, air): (
        Arc<dyn LocationSource>,
        Arc<dyn ForecastSource>,
        Arc<dyn AirQualitySource>,
    ) = if mock {
        (Arc::new(MockSource), Arc::new(MockSource), Arc::new(MockSource))
    } else {
        (
            Arc::new(
                GeocodeClient::with_base_url(config.geocode_url.clone())
                    .context("Failed to build geocoding client")?,
            ),
            Arc::new(
                ForecastClient::with_base_url(config.forecast_url.clone())
                    .context("Failed to build forecast client")?,
            ),
            Arc::new(
                AirQualityClient::with_base_url(config.air_quality_url.clone())
                    .context("Failed to build air-quality client")?,
            ),
        )
    };

    let controller = WeatherController::new(forecast, air, store);

    if let Some(unit) = unit {
        controller.override_unit(unit);
    }

    let location = match place {
        Some(place) => {
            let candidates = geocoder
                .search(&place, config.geocode_count, &config.language)
                .await
                .context("Geocoding search failed")?;
            pick_candidate(&place, candidates, first)?
        }
        None => controller.state().selected,
    };
    tracing::debug!(
        "Loading weather for {} ({:.4}, {:.4})",
        location.label(),
        location.latitude,
        location.longitude
    );

    controller.select(location).await;
    render::render(&controller.state());
    Ok(())
}

fn set_unit(unit: Option<Unit>) -> Result<()> {
    let unit = match unit {
        Some(unit) => unit,
        None => Select::new("Temperature unit:", vec![Unit::Celsius, Unit::Fahrenheit])
            .prompt()
            .context("Unit selection cancelled")?,
    };

    let store = FileStore::new(&Config::state_dir()?);
    store.set(skycast_core::weather::UNIT_KEY, unit.as_str());
    println!("Unit preference set to {unit}.");
    Ok(())
}

struct Candidate(Location);

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  ({:.4}, {:.4})", self.0.label(), self.0.latitude, self.0.longitude)
    }
}

fn pick_candidate(place: &str, candidates: Vec<Location>, first: bool) -> Result<Location> {
    if candidates.is_empty() {
        bail!("No locations found for {place:?}.");
    }

    if first || candidates.len() == 1 {
        return Ok(candidates.into_iter().next().expect("non-empty"));
    }

    let options = candidates.into_iter().map(Candidate).collect();
    let chosen = Select::new("Which location?", options)
        .prompt()
        .context("Location selection cancelled")?;

    Ok(chosen.0)
}
