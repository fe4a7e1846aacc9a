use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::try_join_all;
use tracing::info;

use crate::domain::event::ActiveEvent;
use crate::domain::product::Product;
use crate::domain::recommendation::{HistoricalSignals, ProductForecast, Season, StoredRecommendation};
use crate::domain::user::{ShopLocation, UserId};
use crate::domain::weather::WeatherReading;
use crate::errors::ApplicationError;
use crate::forecast::adjustment::{adjusted_quantity, prudent_quantity, total_adjustment};
use crate::forecast::calendar::{french_weekday, history_dates};
use crate::forecast::confidence::confidence_level;
use crate::forecast::explanation::{build_explanation, ExplanationInput};
use crate::forecast::weighting::{signal_weights, weighted_base};
use crate::ports::{EventCatalog, ProductCatalog, RecommendationStore, SalesHistory};
use crate::weather::WeatherProvider;

/// Context shared by every product of one generation.
#[derive(Clone, Debug, PartialEq)]
pub struct ForecastContext {
    pub weather: WeatherReading,
    pub cultural_events: Vec<ActiveEvent>,
    pub exceptional_events: Vec<ActiveEvent>,
}

/// Pure forecast for one product once its inputs are gathered.
pub fn compute_forecast(
    product: &Product,
    target_date: NaiveDate,
    history: HistoricalSignals,
    context: &ForecastContext,
) -> ProductForecast {
    let weights = signal_weights(&history);
    let base_quantity = weighted_base(&history, &weights);
    let adjustment_percent = total_adjustment(
        context.weather.impact_percent,
        &context.cultural_events,
        &context.exceptional_events,
    );
    let standard_quantity = adjusted_quantity(base_quantity, adjustment_percent);
    let prudent_quantity = prudent_quantity(standard_quantity);

    let cultural_events = event_names(&context.cultural_events);
    let exceptional_events = event_names(&context.exceptional_events);
    let explanation = build_explanation(&ExplanationInput {
        base_quantity,
        weather: &context.weather,
        cultural_events: &cultural_events,
        exceptional_events: &exceptional_events,
        adjustment_percent,
    });

    ProductForecast {
        product_id: product.id,
        product_name: product.name.clone(),
        target_date,
        history,
        weights,
        base_quantity,
        weather: context.weather.clone(),
        cultural_events,
        exceptional_events,
        adjustment_percent,
        standard_quantity,
        prudent_quantity,
        confidence: confidence_level(&history),
        explanation,
        season: Season::of(target_date),
        weekday: french_weekday(target_date).to_owned(),
    }
}

fn event_names(events: &[ActiveEvent]) -> Vec<String> {
    events.iter().map(|event| event.name.clone()).collect()
}

pub struct RecommendationEngine {
    products: Arc<dyn ProductCatalog>,
    sales: Arc<dyn SalesHistory>,
    events: Arc<dyn EventCatalog>,
    recommendations: Arc<dyn RecommendationStore>,
    weather: WeatherProvider,
}

impl RecommendationEngine {
    pub fn new(
        products: Arc<dyn ProductCatalog>,
        sales: Arc<dyn SalesHistory>,
        events: Arc<dyn EventCatalog>,
        recommendations: Arc<dyn RecommendationStore>,
        weather: WeatherProvider,
    ) -> Self {
        Self { products, sales, events, recommendations, weather }
    }

    /// Forecasts every active product of `user_id` for `target_date` and persists the batch.
    ///
    /// Weather failures degrade to a neutral reading. Any store failure aborts the
    /// whole batch before anything is written.
    pub async fn generate(
        &self,
        user_id: UserId,
        target_date: NaiveDate,
        latitude: f64,
        longitude: f64,
        now: DateTime<Utc>,
    ) -> Result<Vec<ProductForecast>, ApplicationError> {
        let location = ShopLocation::new(latitude, longitude)?;
        let products = self.products.list_active_products(user_id).await?;
        if products.is_empty() {
            info!(
                event_name = "forecast.generate.skipped",
                user_id = user_id.0,
                target_date = %target_date,
                "no active products"
            );
            return Ok(Vec::new());
        }

        let weather = self
            .weather
            .forecast_or_neutral(location.latitude, location.longitude, target_date, now)
            .await;
        let (cultural_events, exceptional_events) = futures::try_join!(
            self.events.active_cultural_events(user_id, target_date),
            self.events.active_exceptional_events(user_id, target_date),
        )?;
        let context = ForecastContext { weather, cultural_events, exceptional_events };

        let forecasts = try_join_all(
            products
                .iter()
                .map(|product| self.forecast_product(user_id, product, target_date, &context)),
        )
        .await?;

        self.recommendations.upsert_batch(user_id, target_date, &forecasts, now).await?;

        info!(
            event_name = "forecast.generate.completed",
            user_id = user_id.0,
            target_date = %target_date,
            products = forecasts.len(),
            weather = context.weather.condition.as_str(),
            "recommendations generated"
        );

        Ok(forecasts)
    }

    pub async fn list_recommendations(
        &self,
        user_id: UserId,
        target_date: NaiveDate,
    ) -> Result<Vec<StoredRecommendation>, ApplicationError> {
        Ok(self.recommendations.list_for_date(user_id, target_date).await?)
    }

    async fn forecast_product(
        &self,
        user_id: UserId,
        product: &Product,
        target_date: NaiveDate,
        context: &ForecastContext,
    ) -> Result<ProductForecast, ApplicationError> {
        let [j7_date, j14_date, j365_date] = history_dates(target_date);
        let (j7, j14, j365) = futures::try_join!(
            self.sales.quantity_sold(user_id, product.id, j7_date),
            self.sales.quantity_sold(user_id, product.id, j14_date),
            self.sales.quantity_sold(user_id, product.id, j365_date),
        )?;

        Ok(compute_forecast(product, target_date, HistoricalSignals { j7, j14, j365 }, context))
    }
}
