use anyhow::Result;
use sqlx::{Sqlite, migrate::MigrateDatabase};

use mealmate::config::Config;

pub mod server;
pub mod user;

#[tracing::instrument(skip_all)]
pub async fn migrate(config: Config) -> Result<()> {
    let pool = mealmate::create_write_pool(&config.database.url).await?;
    mealmate_db::migrate(&pool).await?;
    pool.close().await;

    tracing::info!("migrations applied");

    Ok(())
}

/// Drops the database file and migrates a fresh one.
#[tracing::instrument(skip_all)]
pub async fn reset(config: Config) -> Result<()> {
    if Sqlite::database_exists(&config.database.url).await? {
        Sqlite::drop_database(&config.database.url).await?;
        tracing::info!(url = %config.database.url, "database dropped");
    }

    migrate(config).await
}
