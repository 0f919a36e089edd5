use crate::ConfigService;
use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_core::mask_sensitive;
use utoipa::{OpenApi, ToSchema};

pub struct SettingsState {
    pub config_service: Arc<ConfigService>,
}

/// Running configuration with secrets masked
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SettingsResponse {
    pub address: String,
    /// Only the backend scheme is exposed (`postgres`, `sqlite`)
    pub database_backend: String,
    pub session_window_minutes: u32,
    pub cors_origins: Vec<String>,
    pub sepay_webhook_key: Option<String>,
    pub postgres_max_connections: u32,
    pub postgres_min_connections: u32,
}

impl From<&crate::ServerConfig> for SettingsResponse {
    fn from(config: &crate::ServerConfig) -> Self {
        let database_backend = config
            .database_url
            .split_once(':')
            .map(|(scheme, _)| scheme.trim_end_matches("ql").to_string())
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            address: config.address.clone(),
            database_backend,
            session_window_minutes: config.session_window_minutes,
            cors_origins: config.cors_origins.clone(),
            sepay_webhook_key: config.sepay_api_key.as_deref().map(mask_sensitive),
            postgres_max_connections: config.postgres_max_connections,
            postgres_min_connections: config.postgres_min_connections,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(get_settings),
    components(schemas(SettingsResponse)),
    tags((name = "Settings", description = "Read-only view of the running configuration"))
)]
pub struct SettingsApiDoc;

pub fn configure_routes() -> Router<Arc<SettingsState>> {
    Router::new().route("/settings", get(get_settings))
}

/// Get the running configuration
#[utoipa::path(
    tag = "Settings",
    get,
    path = "/settings",
    responses(
        (status = 200, description = "Configuration with sensitive fields masked", body = SettingsResponse)
    )
)]
async fn get_settings(State(state): State<Arc<SettingsState>>) -> Json<SettingsResponse> {
    let config = state.config_service.get_server_config();
    Json(SettingsResponse::from(config.as_ref()))
}
