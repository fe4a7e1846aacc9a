//! SQLite-backed construction of the engine, weather provider and decision service.

use std::sync::Arc;

use fournee_core::ports::ForecastSource;
use fournee_core::weather::WeatherProvider;
use fournee_core::{DecisionService, RecommendationEngine};

use crate::repositories::{
    SqlDecisionRepository, SqlEventRepository, SqlProductRepository, SqlRecommendationRepository,
    SqlSalesRepository, SqlWeatherCacheRepository,
};
use crate::DbPool;

pub fn weather_provider(pool: &DbPool, source: Arc<dyn ForecastSource>) -> WeatherProvider {
    WeatherProvider::new(Arc::new(SqlWeatherCacheRepository::new(pool.clone())), source)
}

pub fn recommendation_engine(
    pool: &DbPool,
    source: Arc<dyn ForecastSource>,
) -> RecommendationEngine {
    RecommendationEngine::new(
        Arc::new(SqlProductRepository::new(pool.clone())),
        Arc::new(SqlSalesRepository::new(pool.clone())),
        Arc::new(SqlEventRepository::new(pool.clone())),
        Arc::new(SqlRecommendationRepository::new(pool.clone())),
        weather_provider(pool, source),
    )
}

pub fn decision_service(pool: &DbPool) -> DecisionService {
    DecisionService::new(
        Arc::new(SqlProductRepository::new(pool.clone())),
        Arc::new(SqlDecisionRepository::new(pool.clone())),
    )
}
