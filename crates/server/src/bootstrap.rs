use std::sync::Arc;

use fournee_core::config::{AppConfig, ConfigError, LoadOptions};
use fournee_core::ports::ForecastSource;
use fournee_core::weather::WeatherError;
use fournee_db::repositories::SqlUserRepository;
use fournee_db::{connect_with_config, migrations, wiring, DbPool};
use fournee_weather::OpenMeteoSource;
use thiserror::Error;
use tracing::info;

use crate::api::ApiState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub api: ApiState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("weather client setup failed: {0}")]
    Weather(#[source] WeatherError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool =
        connect_with_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let source = OpenMeteoSource::from_config(&config.weather).map_err(BootstrapError::Weather)?;
    let api = api_state(db_pool.clone(), Arc::new(source));

    Ok(Application { config, db_pool, api })
}

/// Wires the SQLite stores and the given forecast source into the API services.
pub fn api_state(db_pool: DbPool, source: Arc<dyn ForecastSource>) -> ApiState {
    ApiState {
        engine: Arc::new(wiring::recommendation_engine(&db_pool, source)),
        decisions: Arc::new(wiring::decision_service(&db_pool)),
        users: Arc::new(SqlUserRepository::new(db_pool)),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use fournee_core::config::{ConfigOverrides, LoadOptions};
    use fournee_core::UserId;

    use crate::bootstrap::bootstrap;

    #[tokio::test]
    async fn bootstrap_rejects_invalid_weather_url() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                weather_forecast_url: Some("ftp://weather.example".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        let message = result.err().expect("error").to_string();
        assert!(message.contains("weather.forecast_url"));
    }

    #[tokio::test]
    async fn bootstrap_applies_migrations_and_wires_services() {
        let dir = tempfile::tempdir().expect("tempdir");
        let database_url = format!("sqlite://{}", dir.path().join("fournee.db").display());
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(database_url),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await
        .expect("bootstrap should succeed");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('recommendations', 'production_decisions', 'weather_cache')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("tables");
        assert_eq!(table_count, 3);

        let listed = app
            .api
            .engine
            .list_recommendations(UserId(1), NaiveDate::from_ymd_opt(2024, 6, 14).expect("date"))
            .await
            .expect("empty list");
        assert!(listed.is_empty());
    }
}
