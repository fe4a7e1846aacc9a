use std::sync::Arc;

use chrono::Utc;
use fournee_core::domain::user::UserId;
use fournee_db::wiring;
use fournee_weather::OpenMeteoSource;

use crate::commands::generate::shop_location;
use crate::commands::{open_database, prepare, to_data, CommandFailure, CommandResult};

/// Weather readings for the next `days` days at the shop's location.
pub fn run(user_id: i64, days: u32) -> CommandResult {
    let (config, runtime) = match prepare("outlook") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let now = Utc::now();
    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        let outcome = async {
            let location = shop_location(&pool, UserId(user_id)).await?;
            let source = OpenMeteoSource::from_config(&config.weather)
                .map_err(|error| ("weather_client", error.to_string(), 3u8))?;
            let readings = wiring::weather_provider(&pool, Arc::new(source))
                .outlook(location.latitude, location.longitude, days, now)
                .await;
            Ok::<_, CommandFailure>(readings)
        }
        .await;
        pool.close().await;
        outcome
    });

    match result {
        Ok(readings) => CommandResult::success_with_data(
            "outlook",
            format!("{} days of weather for shop {user_id}", readings.len()),
            to_data(&readings),
        ),
        Err(failure) => CommandResult::from_failure("outlook", failure),
    }
}
