use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use fournee_core::config::WeatherConfig;
use fournee_core::domain::weather::{DailyObservation, WeatherBackend};
use fournee_core::ports::ForecastSource;
use fournee_core::weather::WeatherError;

use crate::response::DailyResponse;

const DAILY_FIELDS: &str = "temperature_2m_mean,precipitation_sum,weathercode";

/// Open-Meteo forecast and archive endpoints behind [`ForecastSource`].
#[derive(Clone)]
pub struct OpenMeteoSource {
    client: Client,
    forecast_url: String,
    archive_url: String,
    api_key: Option<SecretString>,
}

impl OpenMeteoSource {
    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| WeatherError::Request(error.to_string()))?;

        Ok(Self::new(
            client,
            config.forecast_url.clone(),
            config.archive_url.clone(),
            config.api_key.clone(),
        ))
    }

    pub fn new(
        client: Client,
        forecast_url: String,
        archive_url: String,
        api_key: Option<SecretString>,
    ) -> Self {
        Self { client, forecast_url, archive_url, api_key }
    }

    fn endpoint(&self, backend: WeatherBackend) -> &str {
        match backend {
            WeatherBackend::Forecast => &self.forecast_url,
            WeatherBackend::Archive => &self.archive_url,
        }
    }

    async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
        backend: WeatherBackend,
    ) -> Result<DailyResponse, WeatherError> {
        let day = date.format("%Y-%m-%d").to_string();
        let mut query = vec![
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("timezone", "auto".to_string()),
            ("start_date", day.clone()),
            ("end_date", day),
        ];
        if let Some(api_key) = &self.api_key {
            query.push(("apikey", api_key.expose_secret().to_string()));
        }

        let url = self.endpoint(backend);
        debug!(
            event_name = "weather.request.started",
            backend = backend.as_str(),
            url,
            date = %date,
            "requesting daily weather"
        );

        let response = self
            .client
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(|error| WeatherError::Request(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                event_name = "weather.request.rejected",
                backend = backend.as_str(),
                status = status.as_u16(),
                "weather service rejected the request"
            );
            return Err(WeatherError::Api { status: status.as_u16() });
        }

        response.json::<DailyResponse>().await.map_err(|error| WeatherError::Request(error.to_string()))
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoSource {
    async fn daily_observation(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
        backend: WeatherBackend,
    ) -> Result<DailyObservation, WeatherError> {
        self.fetch(latitude, longitude, date, backend).await?.first_observation()
    }
}
