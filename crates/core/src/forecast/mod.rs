//! Next-day production forecast: weighting, contextual adjustment, confidence
//! and explanation, orchestrated by [`RecommendationEngine`].

pub mod adjustment;
pub mod calendar;
pub mod confidence;
pub mod engine;
pub mod explanation;
pub mod weighting;

pub use engine::{compute_forecast, ForecastContext, RecommendationEngine};
