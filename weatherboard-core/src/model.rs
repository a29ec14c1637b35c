use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider-agnostic weather facts for one point in time.
///
/// Every field is independently defaultable; nothing here is validated
/// against anything else. Providers fill what their upstream offers and
/// leave the rest at its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherDetails {
    pub observation_time: DateTime<Utc>,
    pub temperature: f64,
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub temperature_apparent: f64,
    pub temperature_high: f64,
    pub temperature_low: f64,
    pub status: String,
    pub detailed_status: String,
    /// Always an existing file once produced by a provider.
    pub icon_path: PathBuf,
    pub sunrise: i64,
    pub sunset: i64,
    pub pressure: i64,
    /// Percentage, 0-100.
    pub humidity: u8,
    pub wind_speed: f64,
    pub wind_direction: String,
    /// Percentage, 0-100.
    pub precip_probability: f64,
}

/// Everything a provider needs to know to query its upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub api_key: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Passed through to the upstream untouched (`auto`, `si`, `metric`, ...).
    pub units: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: "00000000".to_string(),
            latitude: 51.0,
            longitude: 0.0,
            units: "auto".to_string(),
        }
    }
}

/// Converts a fraction (0-1) reported by an upstream into a percentage.
pub(crate) fn fraction_to_percent(fraction: f64) -> f64 {
    fraction * 100.0
}

/// Converts a fractional humidity (0-1) into a whole percentage.
pub(crate) fn humidity_percent(fraction: f64) -> u8 {
    fraction_to_percent(fraction).round() as u8
}

pub(crate) fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}

/// Sixteen-point compass name for a bearing in degrees.
pub(crate) fn compass_point(bearing: f64) -> String {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];

    let normalized = bearing.rem_euclid(360.0);
    let idx = ((normalized / 22.5).round() as usize) % POINTS.len();
    POINTS[idx].to_string()
}
