//! Storefront CLI
//!
//! Runs the HTTP API (tracking, analytics, orders, chat) and the database
//! migrations from a single binary.

mod commands;

use clap::{Parser, Subcommand};
use commands::{MigrateCommand, ServeCommand};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer};

const WORKSPACE_TARGETS: &[&str] = &[
    "storefront",
    "storefront_core",
    "storefront_config",
    "storefront_database",
    "storefront_migrations",
    "storefront_entities",
    "storefront_tracking",
    "storefront_analytics",
    "storefront_commerce",
    "storefront_chat",
    "tower_http",
];

const QUIET_TARGETS: &[&str] = &["sqlx", "sea_orm", "sea_orm_migration", "hyper", "tower", "h2"];

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "STOREFRONT_LOG_LEVEL", global = true)]
    log_level: String,

    /// Log format: compact, full
    #[arg(
        long,
        default_value = "compact",
        env = "STOREFRONT_LOG_FORMAT",
        global = true
    )]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve(ServeCommand),
    /// Apply, roll back or inspect database migrations
    Migrate(MigrateCommand),
}

/// Workspace crates at `level`, chatty dependencies at `warn`
fn default_filter(level: &str) -> String {
    WORKSPACE_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .chain(QUIET_TARGETS.iter().map(|target| format!("{}=warn", target)))
        .collect::<Vec<_>>()
        .join(",")
}

fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    // RUST_LOG wins when set
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::try_from_default_env()
            .map_err(|e| anyhow::anyhow!("Invalid RUST_LOG environment variable: {}", e))?
    } else {
        EnvFilter::try_new(default_filter(&cli.log_level))
            .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", cli.log_level, e))?
    };

    let fmt_layer = match cli.log_format.as_str() {
        "full" => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    match cli.command {
        Commands::Serve(serve_cmd) => serve_cmd.execute(),
        Commands::Migrate(migrate_cmd) => migrate_cmd.execute(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_quiets_dependencies() {
        let filter = default_filter("debug");
        assert!(filter.starts_with("storefront=debug,"));
        assert!(filter.contains("storefront_chat=debug"));
        assert!(filter.contains("sqlx=warn"));
        assert!(filter.contains("sea_orm=warn"));
        assert!(EnvFilter::try_new(filter).is_ok());
    }

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::try_parse_from([
            "storefront",
            "--log-format",
            "full",
            "serve",
            "--database-url",
            "postgres://localhost/shop",
            "--session-window-minutes",
            "15",
            "--cors-origins",
            "https://shop.example.com,https://admin.example.com",
        ])
        .unwrap();

        assert_eq!(cli.log_format, "full");
        let Commands::Serve(serve) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(serve.database_url, "postgres://localhost/shop");
        assert_eq!(serve.session_window_minutes, 15);
        assert_eq!(serve.address, "127.0.0.1:4000");
    }

    #[test]
    fn test_parse_migrate_down_steps() {
        let cli = Cli::try_parse_from([
            "storefront",
            "migrate",
            "--database-url",
            "postgres://localhost/shop",
            "down",
            "--steps",
            "2",
        ])
        .unwrap();

        let Commands::Migrate(migrate) = cli.command else {
            panic!("expected migrate");
        };
        assert!(matches!(
            migrate.action,
            commands::MigrateAction::Down { steps: 2 }
        ));
    }
}
