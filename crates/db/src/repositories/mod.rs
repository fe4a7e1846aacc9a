use thiserror::Error;

use fournee_core::errors::StoreError;

pub mod codec;
pub mod decision;
pub mod event;
pub mod memory;
pub mod product;
pub mod recommendation;
pub mod sales;
pub mod user;
pub mod weather_cache;

pub use decision::SqlDecisionRepository;
pub use event::{NewCulturalEvent, NewExceptionalEvent, SqlEventRepository};
pub use memory::{
    InMemoryDecisionRepository, InMemoryEventRepository, InMemoryProductRepository,
    InMemoryRecommendationRepository, InMemorySalesRepository, InMemoryUserRepository,
    InMemoryWeatherCacheRepository,
};
pub use product::{NewProduct, SqlProductRepository};
pub use recommendation::SqlRecommendationRepository;
pub use sales::{NewSale, SqlSalesRepository};
pub use user::{NewUser, SqlUserRepository};
pub use weather_cache::SqlWeatherCacheRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for StoreError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Database(error) => StoreError::Query(error.to_string()),
            RepositoryError::Decode(message) => StoreError::Decode(message),
        }
    }
}
