use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Beau,
    Moyen,
    Mauvais,
}

impl WeatherCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beau => "beau",
            Self::Moyen => "moyen",
            Self::Mauvais => "mauvais",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "beau" => Some(Self::Beau),
            "moyen" => Some(Self::Moyen),
            "mauvais" => Some(Self::Mauvais),
            _ => None,
        }
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Simplified weather for one date plus its sales impact in percent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub date: NaiveDate,
    pub condition: WeatherCondition,
    pub temperature_c: f64,
    pub precipitation_mm: f64,
    pub impact_percent: i32,
}

impl WeatherReading {
    pub const NEUTRAL_TEMPERATURE_C: f64 = 15.0;

    pub fn neutral(date: NaiveDate) -> Self {
        Self {
            date,
            condition: WeatherCondition::Moyen,
            temperature_c: Self::NEUTRAL_TEMPERATURE_C,
            precipitation_mm: 0.0,
            impact_percent: 0,
        }
    }
}

/// Cached reading keyed by (latitude, longitude, forecast_date).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherCacheEntry {
    pub latitude: f64,
    pub longitude: f64,
    pub forecast_date: NaiveDate,
    pub temperature_c: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub condition: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

/// Raw daily values returned by a forecast source.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyObservation {
    pub temperature_c: f64,
    pub precipitation_mm: f64,
    pub weather_code: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherBackend {
    Forecast,
    Archive,
}

impl WeatherBackend {
    pub const FORECAST_HORIZON_DAYS: i64 = 16;

    /// Dates from today up to the forecast horizon use the forecast backend.
    pub fn for_date(date: NaiveDate, today: NaiveDate) -> Self {
        let days_ahead = (date - today).num_days();
        if (0..=Self::FORECAST_HORIZON_DAYS).contains(&days_ahead) {
            Self::Forecast
        } else {
            Self::Archive
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forecast => "forecast",
            Self::Archive => "archive",
        }
    }
}
