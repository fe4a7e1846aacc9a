use fournee_db::migrations::MIGRATOR;

use crate::commands::{open_database, prepare, CommandFailure, CommandResult};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("migrate") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        pool.close().await;
        Ok::<(), CommandFailure>(())
    });

    match result {
        Ok(()) => CommandResult::success(
            "migrate",
            format!("schema up to date ({} migrations)", MIGRATOR.iter().count()),
        ),
        Err(failure) => CommandResult::from_failure("migrate", failure),
    }
}
