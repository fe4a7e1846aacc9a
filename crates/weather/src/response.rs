//! Open-Meteo `daily` payload.

use serde::Deserialize;

use fournee_core::domain::weather::DailyObservation;
use fournee_core::weather::WeatherError;

#[derive(Debug, Default, Deserialize)]
pub struct DailyResponse {
    #[serde(default)]
    pub daily: Option<DailySeries>,
}

/// Parallel arrays indexed by day; values may be `null` for days without data.
#[derive(Debug, Default, Deserialize)]
pub struct DailySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_mean: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    pub weathercode: Vec<Option<f64>>,
}

impl DailyResponse {
    /// First day of the series. Missing precipitation counts as dry.
    pub fn first_observation(self) -> Result<DailyObservation, WeatherError> {
        let daily = self.daily.filter(|daily| !daily.time.is_empty());
        let Some(daily) = daily else {
            return Err(WeatherError::EmptyResponse);
        };

        let temperature_c = first(&daily.temperature_2m_mean)
            .ok_or(WeatherError::MissingField("temperature_2m_mean"))?;
        let weather_code =
            first(&daily.weathercode).ok_or(WeatherError::MissingField("weathercode"))?;
        let precipitation_mm = first(&daily.precipitation_sum).unwrap_or(0.0);

        Ok(DailyObservation { temperature_c, precipitation_mm, weather_code: weather_code as i32 })
    }
}

fn first(values: &[Option<f64>]) -> Option<f64> {
    values.first().copied().flatten()
}
