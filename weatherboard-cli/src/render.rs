use serde::Serialize;
use weatherboard_core::{WeatherDetails, WeatherProvider};

/// Everything one redraw needs, in the shape `--json` prints.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub provider: String,
    pub current: &'a WeatherDetails,
    pub forecast: Vec<&'a WeatherDetails>,
}

impl<'a> Snapshot<'a> {
    pub fn capture(provider: &'a dyn WeatherProvider, days: usize) -> Self {
        Self {
            provider: provider.id().to_string(),
            current: provider.current(),
            forecast: (0..days).map(|day| provider.forecast(day)).collect(),
        }
    }
}

pub fn degrees(value: f64) -> String {
    format!("{value:.1}°")
}

pub fn current_block(details: &WeatherDetails) -> String {
    let mut out = format!(
        "{}  {}\n  feels like {}  humidity {}%  pressure {}\n  icon {}",
        degrees(details.temperature),
        details.status,
        degrees(details.temperature_apparent),
        details.humidity,
        details.pressure,
        details.icon_path.display(),
    );

    if !details.wind_direction.is_empty() {
        out.push_str(&format!(
            "\n  wind {:.1} {}",
            details.wind_speed, details.wind_direction
        ));
    }

    out
}

/// One forecast card: weekday, low / high, precipitation chance.
pub fn forecast_card(details: &WeatherDetails) -> String {
    format!(
        "{:<9} {} / {}  {:>3.0}%  {}",
        details.observation_time.format("%A").to_string(),
        degrees(details.temperature_low),
        degrees(details.temperature_high),
        details.precip_probability,
        details.icon_path.display(),
    )
}

pub fn text(snapshot: &Snapshot<'_>) -> String {
    let mut out = format!("[{}] {}", snapshot.provider, current_block(snapshot.current));

    for day in &snapshot.forecast {
        out.push('\n');
        out.push_str(&forecast_card(day));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;

    fn day() -> WeatherDetails {
        WeatherDetails {
            observation_time: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            temperature_low: 2.04,
            temperature_high: 8.0,
            precip_probability: 35.0,
            icon_path: PathBuf::from("/icons/rain.png"),
            ..WeatherDetails::default()
        }
    }

    #[test]
    fn degrees_keep_one_decimal() {
        assert_eq!(degrees(20.0), "20.0°");
        assert_eq!(degrees(-3.46), "-3.5°");
    }

    #[test]
    fn forecast_card_shows_weekday_and_range() {
        let card = forecast_card(&day());

        assert!(card.starts_with("Monday"));
        assert!(card.contains("2.0° / 8.0°"));
        assert!(card.contains(" 35%"));
        assert!(card.ends_with("/icons/rain.png"));
    }

    #[test]
    fn current_block_skips_missing_wind() {
        let details = WeatherDetails {
            temperature: 12.0,
            humidity: 42,
            pressure: 1013,
            status: "Clear".to_string(),
            ..WeatherDetails::default()
        };

        let block = current_block(&details);
        assert!(block.starts_with("12.0°  Clear"));
        assert!(block.contains("humidity 42%"));
        assert!(block.contains("pressure 1013"));
        assert!(!block.contains("wind"));
    }

    #[test]
    fn snapshot_serializes_forecast_cards() {
        let current = WeatherDetails::default();
        let forecast = day();
        let snapshot = Snapshot {
            provider: "darksky".to_string(),
            current: &current,
            forecast: vec![&forecast],
        };

        let json = serde_json::to_value(&snapshot).expect("serialize");
        assert_eq!(json["provider"], "darksky");
        assert_eq!(json["forecast"][0]["precip_probability"], 35.0);
        assert_eq!(json["forecast"][0]["icon_path"], "/icons/rain.png");
    }
}
