pub mod location;
pub mod migrate;
pub mod serve;

use anyhow::Context;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::database::DatabaseManager;

/// Load configuration from the environment, failing with the config error as context.
pub(crate) fn load_config() -> anyhow::Result<AppConfig> {
    AppConfig::from_env().context("invalid configuration")
}

/// Connect to Postgres and make sure the schema exists.
pub(crate) async fn connect_and_migrate(config: &AppConfig) -> anyhow::Result<PgPool> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .with_context(|| {
            format!(
                "failed to connect to {}",
                config.redacted_database_url().unwrap_or_else(|| "<unset>".to_string())
            )
        })?;
    DatabaseManager::migrate(&pool)
        .await
        .context("failed to apply schema")?;
    Ok(pool)
}
