use clap::{Args, Subcommand};
use storefront_core::DatabaseConfig;
use storefront_database::{establish_connection, DbConnection, MigrationMode};
use storefront_migrations::{Migrator, MigratorTrait};
use tracing::info;

#[derive(Args)]
pub struct MigrateCommand {
    /// Database connection URL
    #[arg(long, env = "STOREFRONT_DATABASE_URL")]
    pub database_url: String,

    #[command(subcommand)]
    pub action: MigrateAction,
}

#[derive(Subcommand)]
pub enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Roll back the most recent migrations
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// List applied and pending migrations
    Status,
}

impl MigrateCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.run())
    }

    async fn run(self) -> anyhow::Result<()> {
        let db = establish_connection(
            &DatabaseConfig::new(self.database_url.clone()),
            MigrationMode::Skip,
        )
        .await?;

        match self.action {
            MigrateAction::Up => {
                Migrator::up(db.as_ref(), None).await?;
                info!("All migrations applied");
            }
            MigrateAction::Down { steps } => {
                Migrator::down(db.as_ref(), Some(steps)).await?;
                info!("Rolled back {} migration(s)", steps);
            }
            MigrateAction::Status => print_status(db.as_ref()).await?,
        }

        Ok(())
    }
}

async fn print_status(db: &DbConnection) -> anyhow::Result<()> {
    let applied = Migrator::get_applied_migrations(db).await?;
    let pending = Migrator::get_pending_migrations(db).await?;

    println!("Applied ({}):", applied.len());
    for migration in &applied {
        println!("  [x] {}", migration.name());
    }
    println!("Pending ({}):", pending.len());
    for migration in &pending {
        println!("  [ ] {}", migration.name());
    }
    Ok(())
}
