use crate::{
    Config,
    error::{FetchError, truncate_body},
    icons::IconSet,
    model::{ProviderSettings, WeatherDetails},
    provider::{darksky::DarkSkyProvider, openweather::OpenWeatherProvider},
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::{convert::TryFrom, fmt::Debug, time::Duration};

pub mod darksky;
pub mod openweather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    DarkSky,
    OpenWeather,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::DarkSky => "darksky",
            ProviderId::OpenWeather => "openweather",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::DarkSky, ProviderId::OpenWeather]
    }

    /// Units selector suggested when configuring this provider.
    pub fn default_units(&self) -> &'static str {
        match self {
            ProviderId::DarkSky => "auto",
            ProviderId::OpenWeather => "metric",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "darksky" | "pirateweather" => Ok(ProviderId::DarkSky),
            "openweather" => Ok(ProviderId::OpenWeather),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: darksky, openweather."
            )),
        }
    }
}

/// Result of one refresh, for the scheduler's own bookkeeping.
///
/// A failed refresh is already logged and reflected in the cached records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Refreshed,
    Failed,
}

/// A weather backend that keeps normalized records for one location.
///
/// Accessors never fail: without data they hand out the sentinel record
/// whose icon is the provider's unknown icon.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    fn settings(&self) -> &ProviderSettings;

    fn settings_mut(&mut self) -> &mut ProviderSettings;

    /// Fetch the configured location once and replace the cached records.
    ///
    /// Errors are logged, not returned. On failure only the icon of the
    /// current record is reset; everything else stays as last fetched.
    async fn update(&mut self) -> UpdateOutcome;

    fn current(&self) -> &WeatherDetails;

    /// Forecast for the zero-based `day` offset, or the sentinel record.
    fn forecast(&self, day: usize) -> &WeatherDetails;

    /// Number of forecast days currently cached.
    fn forecast_len(&self) -> usize;

    /// Replace the whole configuration. Values are stored unvalidated.
    fn configure(&mut self, settings: ProviderSettings) {
        *self.settings_mut() = settings;
    }

    fn set_api_key(&mut self, api_key: String) {
        self.settings_mut().api_key = api_key;
    }

    fn set_location(&mut self, latitude: f64, longitude: f64, units: String) {
        let settings = self.settings_mut();
        settings.latitude = latitude;
        settings.longitude = longitude;
        settings.units = units;
    }
}

/// Send `request` and decode a JSON body, mapping every failure to a
/// [`FetchError`] tagged with `provider`.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    provider: &'static str,
    request: RequestBuilder,
) -> Result<T, FetchError> {
    // The URL carries the API key, so it never makes it into the error.
    let res = request.send().await.map_err(|source| FetchError::Request {
        provider,
        source: source.without_url(),
    })?;

    let status = res.status();
    let body = res.text().await.map_err(|source| FetchError::Request {
        provider,
        source: source.without_url(),
    })?;

    if !status.is_success() {
        return Err(FetchError::Status {
            provider,
            status,
            body: truncate_body(&body),
        });
    }

    serde_json::from_str(&body).map_err(|source| FetchError::Parse { provider, source })
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let settings = config.provider_settings(id)?;
    let icons = IconSet::new(config.icons_dir());

    let http = Client::builder()
        .timeout(Duration::from_secs(config.display.request_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    let base_url = config
        .provider_config(id)
        .and_then(|cfg| cfg.base_url.clone());

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::DarkSky => {
            let mut provider = DarkSkyProvider::new(settings, icons).with_http_client(http);
            if let Some(url) = base_url {
                provider = provider.with_base_url(url);
            }
            Box::new(provider)
        }
        ProviderId::OpenWeather => {
            let mut provider = OpenWeatherProvider::new(settings, icons).with_http_client(http);
            if let Some(url) = base_url {
                provider = provider.with_base_url(url);
            }
            Box::new(provider)
        }
    };

    Ok(boxed)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn pirateweather_is_an_alias_for_darksky() {
        let parsed = ProviderId::try_from("PirateWeather").expect("alias should parse");
        assert_eq!(parsed, ProviderId::DarkSky);
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(ProviderId::DarkSky, &cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured for provider"));
    }

    #[test]
    fn default_provider_from_config_errors_when_not_set() {
        let cfg = Config::default();
        let err = default_provider_from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No default provider configured"));
        assert!(msg.contains("Hint: run `weatherboard configure"));
    }

    #[test]
    fn default_provider_from_config_works_when_set_and_configured() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "KEY".to_string());

        let provider = default_provider_from_config(&cfg).expect("provider should build");
        assert_eq!(provider.id(), ProviderId::OpenWeather);
        assert_eq!(provider.settings().api_key, "KEY");
    }

    #[test]
    fn built_provider_carries_configured_location() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::DarkSky, "KEY".to_string());
        cfg.location.latitude = 40.7;
        cfg.location.longitude = -74.0;
        cfg.location.units = "us".to_string();

        let provider = default_provider_from_config(&cfg).expect("provider should build");
        let settings = provider.settings();

        assert_eq!(settings.latitude, 40.7);
        assert_eq!(settings.longitude, -74.0);
        assert_eq!(settings.units, "us");
    }

    #[tokio::test]
    async fn request_errors_do_not_leak_the_url() {
        let request = Client::new().get("http://127.0.0.1:9/forecast/SECRET-KEY/51,0");

        let err = fetch_json::<serde_json::Value>("darksky", request)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Request { .. }));
        let rendered = format!("{err} {err:?}");
        assert!(!rendered.contains("SECRET-KEY"), "{rendered}");
    }

    #[test]
    fn setters_store_values_unvalidated() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::DarkSky, "KEY".to_string());
        let mut provider = default_provider_from_config(&cfg).expect("provider should build");

        provider.set_api_key(String::new());
        provider.set_location(123.0, -500.0, "bogus".to_string());

        let settings = provider.settings();
        assert_eq!(settings.api_key, "");
        assert_eq!(settings.latitude, 123.0);
        assert_eq!(settings.longitude, -500.0);
        assert_eq!(settings.units, "bogus");
    }
}
