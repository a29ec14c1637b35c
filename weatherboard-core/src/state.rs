use crate::{icons::IconSet, model::WeatherDetails};

/// Normalized records shared by every provider: the latest current
/// conditions, the latest forecast days and the sentinel to fall back on.
#[derive(Debug, Clone)]
pub struct ForecastState {
    icons: IconSet,
    current: Option<WeatherDetails>,
    days: Vec<WeatherDetails>,
}

impl ForecastState {
    pub fn new(icons: IconSet) -> Self {
        Self {
            icons,
            current: None,
            days: Vec::new(),
        }
    }

    pub fn icons(&self) -> &IconSet {
        &self.icons
    }

    /// Replace both cached views after a successful refresh.
    pub fn replace(&mut self, current: WeatherDetails, days: Vec<WeatherDetails>) {
        self.current = Some(current);
        self.days = days;
    }

    /// Record a failed refresh.
    ///
    /// Only the icon of the current record is reset; every other field and
    /// the forecast days keep their last known values. With no prior data the
    /// current view stays on the sentinel.
    pub fn mark_failed(&mut self) {
        if let Some(current) = self.current.as_mut() {
            current.icon_path = self.icons.unknown();
        }
    }

    pub fn current(&self) -> &WeatherDetails {
        self.current.as_ref().unwrap_or_else(|| self.icons.sentinel())
    }

    pub fn forecast(&self, day: usize) -> &WeatherDetails {
        self.days.get(day).unwrap_or_else(|| self.icons.sentinel())
    }

    pub fn forecast_len(&self) -> usize {
        self.days.len()
    }
}
