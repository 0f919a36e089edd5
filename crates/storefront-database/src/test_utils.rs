//! Postgres test database backed by testcontainers
//!
//! Every `TestDatabase` owns its own container, so tests never share rows.
//! Requires a running Docker daemon; tests using it are `#[ignore]`d.

use crate::DbConnection;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, Statement};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use std::time::Duration;
use storefront_migrations::Migrator;
use testcontainers::{runners::AsyncRunner, ContainerAsync, GenericImage, ImageExt};

const DB_NAME: &str = "storefront_test";
const DB_USER: &str = "storefront";
const DB_PASSWORD: &str = "storefront";

pub struct TestDatabase {
    pub db: Arc<DbConnection>,
    pub database_url: String,
    _container: ContainerAsync<GenericImage>,
}

impl TestDatabase {
    /// Start a fresh Postgres container without running migrations
    pub async fn new() -> anyhow::Result<Self> {
        let container = GenericImage::new("postgres", "16-alpine")
            .with_env_var("POSTGRES_DB", DB_NAME)
            .with_env_var("POSTGRES_USER", DB_USER)
            .with_env_var("POSTGRES_PASSWORD", DB_PASSWORD)
            .with_env_var("POSTGRES_HOST_AUTH_METHOD", "trust")
            .start()
            .await?;

        let port = container.get_host_port_ipv4(5432).await?;
        let database_url = format!(
            "postgresql://{}:{}@localhost:{}/{}",
            DB_USER, DB_PASSWORD, port, DB_NAME
        );

        let db = Self::connect_with_retry(&database_url, 15).await?;

        Ok(Self {
            db: Arc::new(db),
            database_url,
            _container: container,
        })
    }

    /// Start a fresh container and apply every migration
    pub async fn with_migrations() -> anyhow::Result<Self> {
        let test_db = Self::new().await?;
        Migrator::up(test_db.db.as_ref(), None)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
        Ok(test_db)
    }

    async fn connect_with_retry(
        database_url: &str,
        max_retries: u32,
    ) -> anyhow::Result<DbConnection> {
        let mut last_error = String::new();
        for _ in 0..max_retries {
            match Database::connect(database_url).await {
                Ok(db) => {
                    let ping = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1");
                    match db.query_one(ping).await {
                        Ok(_) => return Ok(db),
                        Err(e) => last_error = e.to_string(),
                    }
                }
                Err(e) => last_error = e.to_string(),
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        Err(anyhow::anyhow!(
            "Failed to connect to test database after {} attempts: {}",
            max_retries,
            last_error
        ))
    }

    pub async fn table_exists(&self, table: &str) -> anyhow::Result<bool> {
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT EXISTS (
                SELECT FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            ) AS \"exists\"",
            [table.into()],
        );
        let row = self.db.query_one(stmt).await?;
        Ok(row
            .and_then(|r| r.try_get::<bool>("", "exists").ok())
            .unwrap_or(false))
    }
}
