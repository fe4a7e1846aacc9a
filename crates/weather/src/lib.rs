//! Open-Meteo implementation of the forecast source port.

pub mod client;
pub mod response;

pub use client::OpenMeteoSource;
pub use response::DailyResponse;
