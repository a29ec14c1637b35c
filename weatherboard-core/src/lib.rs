//! Core library for the `weatherboard` display.
//!
//! This crate defines:
//! - The provider-agnostic [`WeatherDetails`] record
//! - The [`WeatherProvider`] abstraction and its upstream adapters
//! - Icon resolution with a guaranteed fallback asset
//! - Configuration & credentials handling
//!
//! It is used by `weatherboard-cli`, but a display front end can depend on it
//! directly and pull records from a provider on every redraw.

pub mod config;
pub mod error;
pub mod icons;
pub mod model;
pub mod provider;
pub mod state;

pub use config::{Config, DisplayConfig, LocationConfig, ProviderConfig};
pub use error::FetchError;
pub use icons::{IconSet, resolve_icon};
pub use model::{ProviderSettings, WeatherDetails};
pub use provider::{
    ProviderId, UpdateOutcome, WeatherProvider, darksky::DarkSkyProvider,
    openweather::OpenWeatherProvider,
};
