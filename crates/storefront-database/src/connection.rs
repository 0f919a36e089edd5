use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use storefront_core::{DatabaseConfig, ServiceError, ServiceResult};
use storefront_migrations::{Migrator, MigratorTrait};
use tracing::{info, log::LevelFilter};

pub type DbConnection = DatabaseConnection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationMode {
    /// Apply pending migrations before handing out the pool
    Apply,
    Skip,
}

pub async fn establish_connection(
    config: &DatabaseConfig,
    migrations: MigrationMode,
) -> ServiceResult<Arc<DbConnection>> {
    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout())
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .sqlx_logging_level(LevelFilter::Debug);

    let db = Database::connect(opt)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;

    if migrations == MigrationMode::Apply {
        Migrator::up(&db, None)
            .await
            .map_err(|e| ServiceError::Migration(e.to_string()))?;
        info!("Database migrations are up to date");
    }

    Ok(Arc::new(db))
}
