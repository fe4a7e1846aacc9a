//! Weather classification and the cached forecast provider.

pub mod classify;
pub mod provider;

use thiserror::Error;

use crate::errors::StoreError;

pub use classify::{classify, weather_impact};
pub use provider::{
    WeatherProvider, DEFAULT_OUTLOOK_DAYS, MAX_OUTLOOK_DAYS, WEATHER_CACHE_TTL_HOURS,
};

/// Failure while resolving weather for a date.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum WeatherError {
    /// Transport failure or timeout talking to the forecast service.
    #[error("weather request failed: {0}")]
    Request(String),
    #[error("weather service returned status {status}")]
    Api { status: u16 },
    #[error("weather service returned no daily data")]
    EmptyResponse,
    #[error("weather response is missing `{0}`")]
    MissingField(&'static str),
    #[error("weather cache failure: {0}")]
    Cache(#[from] StoreError),
}
