//! Registers the running [`ServerConfig`] for the other plugins

use std::sync::Arc;

use storefront_core::plugin::{
    PluginContext, PluginFuture, PluginRoutes, ServiceRegistrationContext, StorefrontPlugin,
};
use utoipa::{openapi::OpenApi, OpenApi as OpenApiTrait};

use crate::{configure_routes, ConfigService, ServerConfig, SettingsApiDoc, SettingsState};

pub struct ConfigPlugin {
    server_config: Arc<ServerConfig>,
}

impl ConfigPlugin {
    pub fn new(server_config: Arc<ServerConfig>) -> Self {
        Self { server_config }
    }
}

impl StorefrontPlugin for ConfigPlugin {
    fn name(&self) -> &'static str {
        "config"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> PluginFuture<'a> {
        Box::pin(async move {
            context.register_service(self.server_config.clone());
            context.register_service(Arc::new(ConfigService::new(self.server_config.clone())));
            tracing::debug!("Config plugin services registered");
            Ok(())
        })
    }

    fn configure_routes(&self, context: &PluginContext) -> Option<PluginRoutes> {
        let config_service = context.require_service::<ConfigService>().ok()?;
        let state = Arc::new(SettingsState { config_service });
        Some(PluginRoutes::new(configure_routes().with_state(state)))
    }

    fn openapi_schema(&self) -> Option<OpenApi> {
        Some(SettingsApiDoc::openapi())
    }
}
