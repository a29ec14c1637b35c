use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    error::FetchError,
    icons::IconSet,
    model::{
        ProviderSettings, WeatherDetails, compass_point, fraction_to_percent, humidity_percent,
        unix_to_utc,
    },
    provider::{ProviderId, UpdateOutcome, fetch_json},
    state::ForecastState,
};

use super::WeatherProvider;

/// Provider for Dark Sky compatible forecast APIs (Pirate Weather and
/// friends), which return `currently` and `daily` blocks in one call.
#[derive(Debug, Clone)]
pub struct DarkSkyProvider {
    settings: ProviderSettings,
    base_url: String,
    http: Client,
    state: ForecastState,
    raw: Option<DsForecast>,
}

impl DarkSkyProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.pirateweather.net";

    pub fn new(settings: ProviderSettings, icons: IconSet) -> Self {
        Self {
            settings,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
            state: ForecastState::new(icons),
            raw: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// The last successfully fetched upstream payload.
    pub fn raw(&self) -> Option<&DsForecast> {
        self.raw.as_ref()
    }

    async fn fetch(&self) -> Result<DsForecast, FetchError> {
        let url = format!(
            "{}/forecast/{}/{},{}",
            self.base_url, self.settings.api_key, self.settings.latitude, self.settings.longitude
        );

        debug!(
            latitude = self.settings.latitude,
            longitude = self.settings.longitude,
            units = %self.settings.units,
            "requesting Dark Sky forecast"
        );

        let request = self.http.get(url).query(&[
            ("exclude", "minutely"),
            ("units", self.settings.units.as_str()),
        ]);

        fetch_json(ProviderId::DarkSky.as_str(), request).await
    }
}

#[async_trait]
impl WeatherProvider for DarkSkyProvider {
    fn id(&self) -> ProviderId {
        ProviderId::DarkSky
    }

    fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut ProviderSettings {
        &mut self.settings
    }

    async fn update(&mut self) -> UpdateOutcome {
        match self.fetch().await {
            Ok(raw) => {
                let icons = self.state.icons();
                let current = current_details(&raw, icons);
                let days = raw.daily.data.iter().map(|day| day_details(day, icons)).collect();

                self.state.replace(current, days);
                info!(
                    provider = %self.id(),
                    days = self.state.forecast_len(),
                    "weather refreshed"
                );
                self.raw = Some(raw);
                UpdateOutcome::Refreshed
            }
            Err(err) => {
                warn!(provider = %self.id(), error = %err, "error getting weather");
                self.state.mark_failed();
                UpdateOutcome::Failed
            }
        }
    }

    fn current(&self) -> &WeatherDetails {
        self.state.current()
    }

    fn forecast(&self, day: usize) -> &WeatherDetails {
        self.state.forecast(day)
    }

    fn forecast_len(&self) -> usize {
        self.state.forecast_len()
    }
}

fn current_details(raw: &DsForecast, icons: &IconSet) -> WeatherDetails {
    let now = &raw.currently;
    let today = raw.daily.data.first();

    WeatherDetails {
        observation_time: unix_to_utc(now.time).unwrap_or_default(),
        temperature: now.temperature,
        temperature_apparent: now.apparent_temperature,
        temperature_min: today
            .map(|d| d.temperature_min.unwrap_or(d.temperature_low))
            .unwrap_or_default(),
        temperature_max: today
            .map(|d| d.temperature_max.unwrap_or(d.temperature_high))
            .unwrap_or_default(),
        status: now.summary.clone().unwrap_or_default(),
        detailed_status: today.and_then(|d| d.summary.clone()).unwrap_or_default(),
        icon_path: icons.resolve(now.icon.as_deref()),
        sunrise: today.and_then(|d| d.sunrise_time).unwrap_or_default(),
        sunset: today.and_then(|d| d.sunset_time).unwrap_or_default(),
        humidity: humidity_percent(now.humidity),
        pressure: now.pressure.round() as i64,
        wind_speed: now.wind_speed.unwrap_or_default(),
        wind_direction: now.wind_bearing.map(compass_point).unwrap_or_default(),
        ..WeatherDetails::default()
    }
}

fn day_details(day: &DsDay, icons: &IconSet) -> WeatherDetails {
    let summary = day.summary.clone().unwrap_or_default();

    WeatherDetails {
        observation_time: unix_to_utc(day.time).unwrap_or_default(),
        temperature_high: day.temperature_high,
        temperature_low: day.temperature_low,
        status: summary.clone(),
        detailed_status: summary,
        icon_path: icons.resolve(day.icon.as_deref()),
        precip_probability: fraction_to_percent(day.precip_probability),
        sunrise: day.sunrise_time.unwrap_or_default(),
        sunset: day.sunset_time.unwrap_or_default(),
        humidity: day.humidity.map(humidity_percent).unwrap_or_default(),
        pressure: day.pressure.map(|p| p.round() as i64).unwrap_or_default(),
        wind_speed: day.wind_speed.unwrap_or_default(),
        wind_direction: day.wind_bearing.map(compass_point).unwrap_or_default(),
        ..WeatherDetails::default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DsForecast {
    pub currently: DsCurrently,
    #[serde(default)]
    pub daily: DsDaily,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DsCurrently {
    pub time: i64,
    pub temperature: f64,
    pub apparent_temperature: f64,
    pub summary: Option<String>,
    pub icon: Option<String>,
    /// Fraction, 0-1.
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: Option<f64>,
    pub wind_bearing: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DsDaily {
    pub summary: Option<String>,
    #[serde(default)]
    pub data: Vec<DsDay>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DsDay {
    pub time: i64,
    pub summary: Option<String>,
    pub icon: Option<String>,
    pub temperature_high: f64,
    pub temperature_low: f64,
    pub temperature_min: Option<f64>,
    pub temperature_max: Option<f64>,
    /// Fraction, 0-1.
    #[serde(default)]
    pub precip_probability: f64,
    pub sunrise_time: Option<i64>,
    pub sunset_time: Option<i64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_bearing: Option<f64>,
}
