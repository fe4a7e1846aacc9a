use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use fournee_core::domain::user::{ShopLocation, UserId};
use fournee_core::ports::UserDirectory;
use fournee_db::repositories::SqlUserRepository;
use fournee_db::{wiring, DbPool};
use fournee_weather::OpenMeteoSource;
use serde::Serialize;

use crate::commands::{open_database, prepare, to_data, CommandFailure, CommandResult};

#[derive(Debug, Serialize)]
struct GeneratedLine {
    product: String,
    standard_quantity: u32,
    prudent_quantity: u32,
    confidence: u8,
    explanation: String,
}

/// Generates and stores recommendations for `user_id` on `date` (default: tomorrow).
pub fn run(user_id: i64, date: Option<NaiveDate>) -> CommandResult {
    let (config, runtime) = match prepare("generate") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let now = Utc::now();
    let target_date = date.unwrap_or_else(|| now.date_naive() + Duration::days(1));

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        let outcome = async {
            let location = shop_location(&pool, UserId(user_id)).await?;
            let source = OpenMeteoSource::from_config(&config.weather)
                .map_err(|error| ("weather_client", error.to_string(), 3u8))?;
            let forecasts = wiring::recommendation_engine(&pool, Arc::new(source))
                .generate(UserId(user_id), target_date, location.latitude, location.longitude, now)
                .await
                .map_err(|error| ("generation", error.to_string(), 7u8))?;
            Ok::<_, CommandFailure>(forecasts)
        }
        .await;
        pool.close().await;
        outcome
    });

    match result {
        Ok(forecasts) => {
            let lines: Vec<GeneratedLine> = forecasts
                .into_iter()
                .map(|forecast| GeneratedLine {
                    product: forecast.product_name,
                    standard_quantity: forecast.standard_quantity,
                    prudent_quantity: forecast.prudent_quantity,
                    confidence: forecast.confidence,
                    explanation: forecast.explanation,
                })
                .collect();
            CommandResult::success_with_data(
                "generate",
                format!("{} recommendations stored for {target_date}", lines.len()),
                to_data(&lines),
            )
        }
        Err(failure) => CommandResult::from_failure("generate", failure),
    }
}

/// Registered location of the shop; unknown shops and shops without a location are reported.
pub(crate) async fn shop_location(
    pool: &DbPool,
    user_id: UserId,
) -> Result<ShopLocation, CommandFailure> {
    let user = SqlUserRepository::new(pool.clone())
        .find_user(user_id)
        .await
        .map_err(|error| ("db_query", error.to_string(), 4u8))?
        .ok_or_else(|| ("unknown_user", format!("no shop with id {user_id}"), 6u8))?;

    user.require_location().map_err(|error| ("missing_location", error.to_string(), 6u8))
}
