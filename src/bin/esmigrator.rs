//! Applies or rolls back the `products` index schema.
//!
//! Reads DIRECTION, MIGRATIONS, MIGRATE_DOWN_WITH_INDEX, ADDRESS, USERNAME and
//! PASSWORD from the environment. Any error aborts with a non-zero exit.

use simplesearch_backend::logging;
use simplesearch_backend::migrate::{Direction, MigrateError, Migrator, MigratorConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init(&std::env::var("ENV").unwrap_or_else(|_| "local".to_string()));

    let config = MigratorConfig::from_env()?;
    let migrator = Migrator::new(&config.engine_config())?;

    match config.direction {
        Direction::Up => {
            let dir = config
                .migrations
                .as_deref()
                .ok_or_else(|| MigrateError::Env("MIGRATIONS is not set".to_string()))?;
            let report = migrator.up(dir).await?;
            tracing::info!(
                "Migrated up: index created = {}, {} files, {} documents",
                report.index_created,
                report.files,
                report.documents
            );
        }
        Direction::Down => {
            migrator.down(config.drop_index_on_down).await?;
            tracing::info!("Migrated down (drop index = {})", config.drop_index_on_down);
        }
    }

    Ok(())
}
