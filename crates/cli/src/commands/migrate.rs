use warmind_core::config::{AppConfig, LoadOptions};
use warmind_db::{connect_with_settings, migrations};

use crate::commands::{runtime, CommandResult, StepFailure};

pub fn run() -> CommandResult {
    CommandResult::from_steps("migrate", apply())
}

fn apply() -> Result<String, StepFailure> {
    let config = AppConfig::load(LoadOptions::default())
        .map_err(|error| ("config_validation", format!("configuration issue: {error}"), 2u8))?;

    runtime()?.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool).await.map_err(|error| ("migration", error.to_string(), 5u8))?;
        pool.close().await;
        Ok::<String, StepFailure>(format!("applied pending migrations to `{}`", config.database.url))
    })
}
