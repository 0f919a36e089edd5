use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use clap::Args;
use http::HeaderValue;
use storefront_analytics::AnalyticsPlugin;
use storefront_chat::ChatPlugin;
use storefront_commerce::CommercePlugin;
use storefront_config::{
    ConfigPlugin, ServerConfig, DEFAULT_ADDRESS, DEFAULT_SESSION_WINDOW_MINUTES,
};
use storefront_core::plugin::PluginManager;
use storefront_database::{establish_connection, DbConnection, MigrationMode};
use storefront_tracking::TrackingPlugin;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use utoipa_swagger_ui::SwaggerUi;

#[derive(Args)]
pub struct ServeCommand {
    /// Address to bind the server to
    #[arg(long, default_value = DEFAULT_ADDRESS, env = "STOREFRONT_ADDRESS")]
    pub address: String,

    /// Database connection URL
    #[arg(long, env = "STOREFRONT_DATABASE_URL")]
    pub database_url: String,

    /// Inactivity window after which a returning visitor gets a new session
    #[arg(
        long,
        default_value_t = DEFAULT_SESSION_WINDOW_MINUTES,
        env = "STOREFRONT_SESSION_WINDOW_MINUTES"
    )]
    pub session_window_minutes: u32,

    /// Comma separated origins allowed to call the API, `*` for any
    #[arg(long, default_value = "*", env = "STOREFRONT_CORS_ORIGINS")]
    pub cors_origins: String,

    /// Key SePay sends as `Authorization: Apikey <key>`
    #[arg(long, env = "STOREFRONT_SEPAY_API_KEY")]
    pub sepay_api_key: Option<String>,
}

impl ServeCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let config = Arc::new(
            ServerConfig::new(self.address, self.database_url)?
                .with_session_window_minutes(self.session_window_minutes)?
                .with_cors_origins(&self.cors_origins)
                .with_sepay_api_key(self.sepay_api_key),
        );

        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(serve(config))
    }
}

async fn serve(config: Arc<ServerConfig>) -> anyhow::Result<()> {
    debug!("Connecting to database...");
    let db = establish_connection(&config.database_config(), MigrationMode::Apply).await?;

    let manager = initialize_plugins(db, config.clone()).await?;
    let app = build_app(&manager, &config)?;

    let listener = TcpListener::bind(&config.address).await?;
    info!("Storefront API listening on {}", config.address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Storefront API stopped");
    Ok(())
}

/// Plugins register in dependency order: config first, then the features
/// that read it.
pub(crate) async fn initialize_plugins(
    db: Arc<DbConnection>,
    config: Arc<ServerConfig>,
) -> anyhow::Result<PluginManager> {
    let mut manager = PluginManager::new();
    manager.service_context().register_service(db);

    manager.register_plugin(Box::new(ConfigPlugin::new(config)));
    manager.register_plugin(Box::new(TrackingPlugin));
    manager.register_plugin(Box::new(AnalyticsPlugin::new()));
    manager.register_plugin(Box::new(CommercePlugin));
    manager.register_plugin(Box::new(ChatPlugin));

    manager
        .initialize_plugins()
        .await
        .map_err(|e| anyhow::anyhow!("Plugin initialization failed: {}", e))?;
    debug!("All plugins initialized");
    Ok(manager)
}

pub(crate) fn build_app(manager: &PluginManager, config: &ServerConfig) -> anyhow::Result<Router> {
    let swagger =
        SwaggerUi::new("/swagger").url("/api-docs/openapi.json", manager.unified_openapi());

    Ok(manager
        .build_application()
        .merge(swagger)
        .layer(cors_layer(config)?)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new()))
}

fn cors_layer(config: &ServerConfig) -> anyhow::Result<CorsLayer> {
    let origin = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", origin, e))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, draining connections");
}
