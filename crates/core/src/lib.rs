pub mod config;
pub mod decisions;
pub mod domain;
pub mod errors;
pub mod forecast;
pub mod ports;
pub mod weather;

pub use config::{AppConfig, ConfigError, LoadOptions, LogFormat};
pub use decisions::DecisionService;
pub use domain::decision::{DecisionDraft, DecisionScenario, NewDecision, ProductionDecision};
pub use domain::event::{ActiveEvent, EventWindow};
pub use domain::product::{ImportanceTier, Product, ProductId};
pub use domain::recommendation::{
    HistoricalSignals, ProductForecast, Season, SignalWeights, StoredRecommendation,
};
pub use domain::user::{ShopLocation, User, UserId};
pub use domain::weather::{
    DailyObservation, WeatherBackend, WeatherCacheEntry, WeatherCondition, WeatherReading,
};
pub use errors::{ApplicationError, DomainError, InterfaceError, StoreError};
pub use forecast::RecommendationEngine;
pub use weather::{WeatherError, WeatherProvider};
