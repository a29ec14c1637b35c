use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    error::FetchError,
    icons::IconSet,
    model::{ProviderSettings, WeatherDetails, compass_point, fraction_to_percent, unix_to_utc},
    provider::{ProviderId, UpdateOutcome, fetch_json},
    state::ForecastState,
};

use super::WeatherProvider;

/// Provider for the OpenWeather One Call API.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    settings: ProviderSettings,
    base_url: String,
    http: Client,
    state: ForecastState,
    raw: Option<OwOneCall>,
}

impl OpenWeatherProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openweathermap.org";

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

    pub fn raw(&self) -> Option<&OwOneCall> {
        self.raw.as_ref()
    }

    async fn fetch(&self) -> Result<OwOneCall, FetchError> {
        let url = format!("{}/data/3.0/onecall", self.base_url);
        let lat = self.settings.latitude.to_string();
        let lon = self.settings.longitude.to_string();

        debug!(latitude = %lat, longitude = %lon, units = %self.settings.units, "requesting OpenWeather one call");

        let request = self.http.get(url).query(&[
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("appid", self.settings.api_key.as_str()),
            ("units", self.settings.units.as_str()),
            ("exclude", "minutely"),
        ]);

        fetch_json(ProviderId::OpenWeather.as_str(), request).await
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
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
                let days = raw.daily.iter().map(|day| day_details(day, icons)).collect();

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

/// Translate an OpenWeather icon code (`01d`, `10n`, ...) into the shared
/// day/night condition vocabulary understood by the icon set.
fn condition_identifier(code: &str) -> Option<&'static str> {
    let night = code.ends_with('n');

    let id = match code.get(..2)? {
        "01" if night => "clear-night",
        "01" => "clear-day",
        "02" | "03" if night => "partly-cloudy-night",
        "02" | "03" => "partly-cloudy-day",
        "04" => "cloudy",
        "09" | "10" => "rain",
        "11" => "thunderstorm",
        "13" => "snow",
        "50" => "fog",
        _ => return None,
    };

    Some(id)
}

fn icon_for(conditions: &[OwCondition], icons: &IconSet) -> std::path::PathBuf {
    let identifier = conditions
        .first()
        .and_then(|c| condition_identifier(&c.icon));
    icons.resolve(identifier)
}

fn current_details(raw: &OwOneCall, icons: &IconSet) -> WeatherDetails {
    let now = &raw.current;
    let today = raw.daily.first();
    let condition = now.weather.first();

    WeatherDetails {
        observation_time: unix_to_utc(now.dt).unwrap_or_default(),
        temperature: now.temp,
        temperature_apparent: now.feels_like,
        temperature_min: today.map(|d| d.temp.min).unwrap_or_default(),
        temperature_max: today.map(|d| d.temp.max).unwrap_or_default(),
        status: condition.map(|c| c.main.clone()).unwrap_or_default(),
        detailed_status: condition.map(|c| c.description.clone()).unwrap_or_default(),
        icon_path: icon_for(&now.weather, icons),
        sunrise: now.sunrise.unwrap_or_default(),
        sunset: now.sunset.unwrap_or_default(),
        // Already a percentage upstream.
        humidity: now.humidity.round() as u8,
        pressure: now.pressure.round() as i64,
        wind_speed: now.wind_speed.unwrap_or_default(),
        wind_direction: now.wind_deg.map(compass_point).unwrap_or_default(),
        ..WeatherDetails::default()
    }
}

fn day_details(day: &OwDay, icons: &IconSet) -> WeatherDetails {
    let condition = day.weather.first();

    WeatherDetails {
        observation_time: unix_to_utc(day.dt).unwrap_or_default(),
        temperature_high: day.temp.max,
        temperature_low: day.temp.min,
        status: condition.map(|c| c.main.clone()).unwrap_or_default(),
        detailed_status: day
            .summary
            .clone()
            .or_else(|| condition.map(|c| c.description.clone()))
            .unwrap_or_default(),
        icon_path: icon_for(&day.weather, icons),
        precip_probability: fraction_to_percent(day.pop),
        sunrise: day.sunrise.unwrap_or_default(),
        sunset: day.sunset.unwrap_or_default(),
        humidity: day.humidity.map(|h| h.round() as u8).unwrap_or_default(),
        pressure: day.pressure.map(|p| p.round() as i64).unwrap_or_default(),
        wind_speed: day.wind_speed.unwrap_or_default(),
        wind_direction: day.wind_deg.map(compass_point).unwrap_or_default(),
        ..WeatherDetails::default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwOneCall {
    pub current: OwCurrent,
    #[serde(default)]
    pub daily: Vec<OwDay>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwCondition {
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwCurrent {
    pub dt: i64,
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: f64,
    /// Percentage, 0-100.
    pub humidity: f64,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
    pub wind_speed: Option<f64>,
    pub wind_deg: Option<f64>,
    #[serde(default)]
    pub weather: Vec<OwCondition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwDayTemp {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwDay {
    pub dt: i64,
    pub summary: Option<String>,
    pub temp: OwDayTemp,
    /// Probability of precipitation, 0-1.
    #[serde(default)]
    pub pop: f64,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
    pub pressure: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_deg: Option<f64>,
    #[serde(default)]
    pub weather: Vec<OwCondition>,
}
