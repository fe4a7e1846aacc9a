use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;

use fournee_core::domain::decision::{NewDecision, ProductionDecision};
use fournee_core::domain::event::{ActiveEvent, EventWindow};
use fournee_core::domain::product::{compare_names, Product, ProductId};
use fournee_core::domain::recommendation::{ProductForecast, StoredRecommendation};
use fournee_core::domain::user::{User, UserId};
use fournee_core::domain::weather::WeatherCacheEntry;
use fournee_core::errors::StoreError;
use fournee_core::ports::{
    DecisionStore, EventCatalog, ProductCatalog, RecommendationStore, SalesHistory, UserDirectory,
    WeatherCacheStore,
};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait::async_trait]
impl UserDirectory for InMemoryUserRepository {
    async fn find_user(&self, user_id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductRepository {
    pub async fn insert(&self, product: Product) {
        self.products.write().await.insert(product.id, product);
    }
}

#[async_trait::async_trait]
impl ProductCatalog for InMemoryProductRepository {
    async fn list_active_products(&self, user_id: UserId) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().await;
        let mut active: Vec<Product> = products
            .values()
            .filter(|product| product.user_id == user_id && product.active)
            .cloned()
            .collect();
        active.sort_by(|left, right| compare_names(&left.name, &right.name));
        Ok(active)
    }
}

#[derive(Default)]
pub struct InMemorySalesRepository {
    sales: RwLock<HashMap<(UserId, ProductId, NaiveDate), u32>>,
}

impl InMemorySalesRepository {
    pub async fn record(&self, user_id: UserId, product_id: ProductId, date: NaiveDate, sold: u32) {
        self.sales.write().await.insert((user_id, product_id, date), sold);
    }
}

#[async_trait::async_trait]
impl SalesHistory for InMemorySalesRepository {
    async fn quantity_sold(
        &self,
        user_id: UserId,
        product_id: ProductId,
        date: NaiveDate,
    ) -> Result<Option<u32>, StoreError> {
        Ok(self.sales.read().await.get(&(user_id, product_id, date)).copied())
    }
}

/// Events already resolved per user: cultural entries stand for subscribed, active calendars.
#[derive(Default)]
pub struct InMemoryEventRepository {
    cultural: RwLock<Vec<(UserId, EventWindow, ActiveEvent)>>,
    exceptional: RwLock<Vec<(UserId, EventWindow, ActiveEvent)>>,
}

impl InMemoryEventRepository {
    pub async fn add_cultural(&self, user_id: UserId, window: EventWindow, event: ActiveEvent) {
        self.cultural.write().await.push((user_id, window, event));
    }

    pub async fn add_exceptional(&self, user_id: UserId, window: EventWindow, event: ActiveEvent) {
        self.exceptional.write().await.push((user_id, window, event));
    }
}

fn events_on(
    events: &[(UserId, EventWindow, ActiveEvent)],
    user_id: UserId,
    date: NaiveDate,
) -> Vec<ActiveEvent> {
    events
        .iter()
        .filter(|(owner, window, _)| *owner == user_id && window.contains(date))
        .map(|(_, _, event)| event.clone())
        .collect()
}

#[async_trait::async_trait]
impl EventCatalog for InMemoryEventRepository {
    async fn active_cultural_events(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Vec<ActiveEvent>, StoreError> {
        Ok(events_on(&self.cultural.read().await, user_id, date))
    }

    async fn active_exceptional_events(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Vec<ActiveEvent>, StoreError> {
        Ok(events_on(&self.exceptional.read().await, user_id, date))
    }
}

#[derive(Default)]
pub struct InMemoryRecommendationRepository {
    rows: RwLock<HashMap<(UserId, ProductId, NaiveDate), StoredRecommendation>>,
}

#[async_trait::async_trait]
impl RecommendationStore for InMemoryRecommendationRepository {
    async fn upsert_batch(
        &self,
        user_id: UserId,
        target_date: NaiveDate,
        forecasts: &[ProductForecast],
        generated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        for forecast in forecasts {
            let key = (user_id, forecast.product_id, target_date);
            let id = rows.get(&key).map(|row| row.id).unwrap_or(rows.len() as i64 + 1);
            rows.insert(
                key,
                StoredRecommendation {
                    id,
                    user_id,
                    product_id: forecast.product_id,
                    product_name: forecast.product_name.clone(),
                    target_date,
                    standard_quantity: forecast.standard_quantity,
                    prudent_quantity: forecast.prudent_quantity,
                    confidence: forecast.confidence,
                    weather_condition: Some(forecast.weather.condition.as_str().to_owned()),
                    weather_impact_percent: forecast.weather.impact_percent,
                    season: forecast.season.as_str().to_owned(),
                    weekday: forecast.weekday.clone(),
                    cultural_events: forecast.cultural_events.clone(),
                    exceptional_events: forecast.exceptional_events.clone(),
                    history: forecast.history,
                    weights: forecast.weights,
                    adjustment_percent: forecast.adjustment_percent,
                    explanation: forecast.explanation.clone(),
                    generated_at,
                },
            );
        }
        Ok(())
    }

    async fn list_for_date(
        &self,
        user_id: UserId,
        target_date: NaiveDate,
    ) -> Result<Vec<StoredRecommendation>, StoreError> {
        let rows = self.rows.read().await;
        let mut listed: Vec<StoredRecommendation> = rows
            .values()
            .filter(|row| row.user_id == user_id && row.target_date == target_date)
            .cloned()
            .collect();
        listed.sort_by(|left, right| {
            right
                .standard_quantity
                .cmp(&left.standard_quantity)
                .then_with(|| compare_names(&left.product_name, &right.product_name))
        });
        Ok(listed)
    }
}

/// Decision store keyed by (user, product, date). Product names come from the seeded catalog.
#[derive(Default)]
pub struct InMemoryDecisionRepository {
    product_names: RwLock<HashMap<ProductId, String>>,
    rows: RwLock<HashMap<(UserId, ProductId, NaiveDate), ProductionDecision>>,
}

impl InMemoryDecisionRepository {
    pub async fn register_product(&self, product: &Product) {
        self.product_names.write().await.insert(product.id, product.name.clone());
    }
}

#[async_trait::async_trait]
impl DecisionStore for InMemoryDecisionRepository {
    async fn upsert_decisions(
        &self,
        user_id: UserId,
        decisions: &[NewDecision],
        validated_at: DateTime<Utc>,
    ) -> Result<Vec<ProductionDecision>, StoreError> {
        let names = self.product_names.read().await;
        let mut rows = self.rows.write().await;
        let mut saved = Vec::with_capacity(decisions.len());

        for decision in decisions {
            let product_name = names.get(&decision.product_id).cloned().ok_or_else(|| {
                StoreError::Query(format!("unknown product {}", decision.product_id))
            })?;
            let key = (user_id, decision.product_id, decision.target_date);
            let id = rows.get(&key).map(|row| row.id).unwrap_or(rows.len() as i64 + 1);
            let row = ProductionDecision {
                id,
                user_id,
                product_id: decision.product_id,
                product_name,
                target_date: decision.target_date,
                scenario: decision.scenario,
                final_quantity: decision.final_quantity,
                recommendation_id: decision.recommendation_id,
                notes: decision.notes.clone(),
                validated_at,
            };
            rows.insert(key, row.clone());
            saved.push(row);
        }

        Ok(saved)
    }

    async fn list_for_date(
        &self,
        user_id: UserId,
        target_date: NaiveDate,
    ) -> Result<Vec<ProductionDecision>, StoreError> {
        let rows = self.rows.read().await;
        let mut listed: Vec<ProductionDecision> = rows
            .values()
            .filter(|row| row.user_id == user_id && row.target_date == target_date)
            .cloned()
            .collect();
        listed.sort_by(|left, right| compare_names(&left.product_name, &right.product_name));
        Ok(listed)
    }
}

#[derive(Default)]
pub struct InMemoryWeatherCacheRepository {
    entries: RwLock<Vec<WeatherCacheEntry>>,
}

fn same_key(entry: &WeatherCacheEntry, latitude: f64, longitude: f64, date: NaiveDate) -> bool {
    entry.latitude == latitude && entry.longitude == longitude && entry.forecast_date == date
}

#[async_trait::async_trait]
impl WeatherCacheStore for InMemoryWeatherCacheRepository {
    async fn get_fresh(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
        fresh_since: DateTime<Utc>,
    ) -> Result<Option<WeatherCacheEntry>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .find(|entry| same_key(entry, latitude, longitude, date) && entry.fetched_at > fresh_since)
            .cloned())
    }

    async fn upsert(&self, entry: WeatherCacheEntry) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.retain(|existing| {
            !same_key(existing, entry.latitude, entry.longitude, entry.forecast_date)
        });
        entries.push(entry);
        Ok(())
    }
}
