use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, Text};
use tracing::info;
use weatherboard_core::{
    Config, LocationConfig, ProviderId, UpdateOutcome, WeatherProvider,
    provider::default_provider_from_config,
};

use crate::render::{self, Snapshot};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherboard", version, about = "Weather display refresher")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials and location for a specific provider.
    Configure {
        /// Provider short name, e.g. "darksky" or "openweather".
        provider: String,
    },

    /// Fetch once and print current conditions and the forecast.
    Show {
        /// Print the normalized records as JSON.
        #[arg(long)]
        json: bool,

        /// Number of forecast days; defaults to the configured card count.
        #[arg(long)]
        days: Option<usize>,
    },

    /// Refresh on the configured interval until interrupted.
    Watch,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };
        let mut config = Config::load_from(&path)?;

        match self.command {
            Command::Configure { provider } => configure(&mut config, &provider, &path)?,
            Command::Show { json, days } => {
                let mut provider = default_provider_from_config(&config)?;
                if provider.update().await == UpdateOutcome::Failed {
                    eprintln!("Weather update failed; showing fallback data.");
                }

                let days = days.unwrap_or(config.display.forecast_days);
                print_snapshot(provider.as_ref(), days, json)?;
            }
            Command::Watch => watch(&config).await?,
        }

        Ok(())
    }
}

fn configure(config: &mut Config, provider: &str, path: &Path) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let latitude = CustomType::<f64>::new("Latitude:")
        .with_default(config.location.latitude)
        .with_error_message("Please enter a number, e.g. 51.5")
        .prompt()
        .context("Failed to read latitude")?;

    let longitude = CustomType::<f64>::new("Longitude:")
        .with_default(config.location.longitude)
        .with_error_message("Please enter a number, e.g. -0.12")
        .prompt()
        .context("Failed to read longitude")?;

    let suggested_units = if config.location.units == LocationConfig::default().units {
        id.default_units().to_string()
    } else {
        config.location.units.clone()
    };
    let units = Text::new("Units:")
        .with_default(&suggested_units)
        .with_help_message("Passed to the provider as-is, e.g. auto, si, us, metric, imperial")
        .prompt()
        .context("Failed to read units")?;

    config.upsert_provider_api_key(id, api_key);
    config.location = LocationConfig {
        latitude,
        longitude,
        units,
    };
    config.save_to(path)?;

    println!("Saved {id} configuration to {}", path.display());
    Ok(())
}

fn print_snapshot(provider: &dyn WeatherProvider, days: usize, json: bool) -> anyhow::Result<()> {
    let snapshot = Snapshot::capture(provider, days);

    if json {
        let out =
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize weather")?;
        println!("{out}");
    } else {
        println!("{}", render::text(&snapshot));
    }

    Ok(())
}

async fn watch(config: &Config) -> anyhow::Result<()> {
    let mut provider = default_provider_from_config(config)?;
    let display = &config.display;

    info!(
        provider = %provider.id(),
        width = config.display.width,
        height = config.display.height,
        interval_secs = config.display.refresh_interval_secs,
        "starting refresh loop"
    );

    // First tick fires immediately, so the board is populated at startup.
    let interval = Duration::from_secs(display.refresh_interval_secs.max(1));
    refresh_loop(
        provider.as_mut(),
        display.forecast_days,
        interval,
        tokio::signal::ctrl_c(),
    )
    .await
}

/// Refresh `provider` every `interval` until `shutdown` resolves.
///
/// `shutdown` is polled across iterations, so a signal that arrives while an
/// update is in flight stops the loop right after that update.
async fn refresh_loop<F>(
    provider: &mut dyn WeatherProvider,
    forecast_days: usize,
    interval: Duration,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future,
{
    let mut ticker = tokio::time::interval(interval);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!("interrupted, stopping refresh loop");
                break;
            }
            _ = ticker.tick() => {
                provider.update().await;
                print_snapshot(provider, forecast_days, false)?;
            }
        }
    }

    Ok(())
}
