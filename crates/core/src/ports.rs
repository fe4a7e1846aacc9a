//! Collaborator traits consumed by the forecast engine and the weather provider.
//!
//! Implementations live in `fournee-db` (SQLite and in-memory) and
//! `fournee-weather` (Open-Meteo). Every store is scoped to one user.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::decision::{NewDecision, ProductionDecision};
use crate::domain::event::ActiveEvent;
use crate::domain::product::{Product, ProductId};
use crate::domain::recommendation::{ProductForecast, StoredRecommendation};
use crate::domain::user::{User, UserId};
use crate::domain::weather::{DailyObservation, WeatherBackend, WeatherCacheEntry};
use crate::errors::StoreError;
use crate::weather::WeatherError;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, user_id: UserId) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Active products of the user, ordered by name.
    async fn list_active_products(&self, user_id: UserId) -> Result<Vec<Product>, StoreError>;
}

#[async_trait]
pub trait SalesHistory: Send + Sync {
    /// Quantity sold on exactly `date`; `None` when nothing was recorded.
    async fn quantity_sold(
        &self,
        user_id: UserId,
        product_id: ProductId,
        date: NaiveDate,
    ) -> Result<Option<u32>, StoreError>;
}

#[async_trait]
pub trait EventCatalog: Send + Sync {
    /// Events of calendars the user has enabled whose interval contains `date`.
    async fn active_cultural_events(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Vec<ActiveEvent>, StoreError>;

    async fn active_exceptional_events(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Vec<ActiveEvent>, StoreError>;
}

#[async_trait]
pub trait RecommendationStore: Send + Sync {
    /// Upserts every forecast keyed by (user, product, date), all or nothing.
    async fn upsert_batch(
        &self,
        user_id: UserId,
        target_date: NaiveDate,
        forecasts: &[ProductForecast],
        generated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Stored recommendations of a day, highest standard quantity first.
    async fn list_for_date(
        &self,
        user_id: UserId,
        target_date: NaiveDate,
    ) -> Result<Vec<StoredRecommendation>, StoreError>;
}

#[async_trait]
pub trait DecisionStore: Send + Sync {
    async fn upsert_decisions(
        &self,
        user_id: UserId,
        decisions: &[NewDecision],
        validated_at: DateTime<Utc>,
    ) -> Result<Vec<ProductionDecision>, StoreError>;

    /// Decisions of a day, ordered by product name.
    async fn list_for_date(
        &self,
        user_id: UserId,
        target_date: NaiveDate,
    ) -> Result<Vec<ProductionDecision>, StoreError>;
}

#[async_trait]
pub trait WeatherCacheStore: Send + Sync {
    /// Entry for exactly (latitude, longitude, date) fetched strictly after `fresh_since`.
    async fn get_fresh(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
        fresh_since: DateTime<Utc>,
    ) -> Result<Option<WeatherCacheEntry>, StoreError>;

    async fn upsert(&self, entry: WeatherCacheEntry) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn daily_observation(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
        backend: WeatherBackend,
    ) -> Result<DailyObservation, WeatherError>;
}
