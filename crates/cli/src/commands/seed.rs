use chrono::{NaiveDate, Utc};
use fournee_db::DemoSeedDataset;

use crate::commands::{open_database, prepare, to_data, CommandResult};

/// Loads the demo shop with sales history ending the day before `today` (default: current date).
pub fn run(today: Option<NaiveDate>) -> CommandResult {
    let (config, runtime) = match prepare("seed") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let now = Utc::now();
    let today = today.unwrap_or_else(|| now.date_naive());

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        let seeded = DemoSeedDataset::load(&pool, today, now)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 6u8));
        pool.close().await;
        seeded
    });

    match result {
        Ok(seeded) => {
            let message = format!(
                "seeded `{}` (user {}): {} products, {} sales rows, {} cultural events, {} exceptional events",
                seeded.shop_name,
                seeded.user_id,
                seeded.products.len(),
                seeded.sales_rows,
                seeded.cultural_events,
                seeded.exceptional_events
            );
            CommandResult::success_with_data("seed", message, to_data(&seeded))
        }
        Err(failure) => CommandResult::from_failure("seed", failure),
    }
}
