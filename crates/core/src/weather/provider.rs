use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::domain::weather::{WeatherBackend, WeatherCacheEntry, WeatherCondition, WeatherReading};
use crate::ports::{ForecastSource, WeatherCacheStore};
use crate::weather::classify::{classify, weather_impact};
use crate::weather::WeatherError;

pub const WEATHER_CACHE_TTL_HOURS: i64 = 6;
pub const DEFAULT_OUTLOOK_DAYS: u32 = 7;
/// Past the forecast horizon every future date falls back to neutral.
pub const MAX_OUTLOOK_DAYS: u32 = WeatherBackend::FORECAST_HORIZON_DAYS as u32;

/// Cached front of a [`ForecastSource`].
#[derive(Clone)]
pub struct WeatherProvider {
    cache: Arc<dyn WeatherCacheStore>,
    source: Arc<dyn ForecastSource>,
}

impl WeatherProvider {
    pub fn new(cache: Arc<dyn WeatherCacheStore>, source: Arc<dyn ForecastSource>) -> Self {
        Self { cache, source }
    }

    pub async fn forecast_for(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<WeatherReading, WeatherError> {
        let fresh_since = now - Duration::hours(WEATHER_CACHE_TTL_HOURS);
        if let Some(entry) = self.cache.get_fresh(latitude, longitude, date, fresh_since).await? {
            debug!(
                event_name = "weather.cache.hit",
                latitude,
                longitude,
                date = %date,
                "reusing cached weather"
            );
            return Ok(reading_from_cache(entry));
        }

        let backend = WeatherBackend::for_date(date, now.date_naive());
        let observation =
            self.source.daily_observation(latitude, longitude, date, backend).await?;

        let condition = classify(
            observation.temperature_c,
            observation.precipitation_mm,
            observation.weather_code,
        );
        let reading = WeatherReading {
            date,
            condition,
            temperature_c: observation.temperature_c,
            precipitation_mm: observation.precipitation_mm,
            impact_percent: weather_impact(
                condition,
                observation.temperature_c,
                observation.precipitation_mm,
            ),
        };

        self.cache
            .upsert(WeatherCacheEntry {
                latitude,
                longitude,
                forecast_date: date,
                temperature_c: Some(reading.temperature_c),
                precipitation_mm: Some(reading.precipitation_mm),
                condition: Some(condition.as_str().to_owned()),
                fetched_at: now,
            })
            .await?;

        debug!(
            event_name = "weather.fetch.completed",
            backend = backend.as_str(),
            date = %date,
            condition = condition.as_str(),
            "weather fetched and cached"
        );

        Ok(reading)
    }

    /// Like [`Self::forecast_for`] but never fails: any error yields the neutral reading.
    pub async fn forecast_or_neutral(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> WeatherReading {
        match self.forecast_for(latitude, longitude, date, now).await {
            Ok(reading) => reading,
            Err(error) => {
                warn!(
                    event_name = "weather.fallback.neutral",
                    error = %error,
                    latitude,
                    longitude,
                    date = %date,
                    "weather unavailable, using neutral reading"
                );
                WeatherReading::neutral(date)
            }
        }
    }

    /// Readings for the `days` dates following `now`'s date, capped at [`MAX_OUTLOOK_DAYS`].
    pub async fn outlook(
        &self,
        latitude: f64,
        longitude: f64,
        days: u32,
        now: DateTime<Utc>,
    ) -> Vec<WeatherReading> {
        let days = days.min(MAX_OUTLOOK_DAYS);
        let today = now.date_naive();
        let mut readings = Vec::with_capacity(days as usize);
        for offset in 1..=i64::from(days) {
            let date = today + Duration::days(offset);
            readings.push(self.forecast_or_neutral(latitude, longitude, date, now).await);
        }
        readings
    }
}

fn reading_from_cache(entry: WeatherCacheEntry) -> WeatherReading {
    let temperature_c = entry.temperature_c.unwrap_or(WeatherReading::NEUTRAL_TEMPERATURE_C);
    let precipitation_mm = entry.precipitation_mm.unwrap_or(0.0);
    let condition = match entry.condition.as_deref().map(WeatherCondition::parse) {
        Some(Some(condition)) => condition,
        _ => {
            warn!(
                event_name = "weather.cache.unknown_condition",
                label = ?entry.condition,
                date = %entry.forecast_date,
                "cached weather condition is not recognised, treating as moyen"
            );
            WeatherCondition::Moyen
        }
    };

    WeatherReading {
        date: entry.forecast_date,
        condition,
        temperature_c,
        precipitation_mm,
        impact_percent: weather_impact(condition, temperature_c, precipitation_mm),
    }
}
