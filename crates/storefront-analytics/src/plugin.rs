//! Analytics plugin: registers `AnalyticsService` (also as `dyn Analytics`)
//! and serves the report endpoints.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use storefront_core::plugin::{
    PluginContext, PluginFuture, PluginRoutes, ServiceRegistrationContext, StorefrontPlugin,
};
use utoipa::{openapi::OpenApi, OpenApi as OpenApiTrait};

use crate::handler::{configure_routes, AnalyticsApiDoc, AppState};
use crate::{Analytics, AnalyticsService};

pub struct AnalyticsPlugin;

impl AnalyticsPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AnalyticsPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl StorefrontPlugin for AnalyticsPlugin {
    fn name(&self) -> &'static str {
        "analytics"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> PluginFuture<'a> {
        Box::pin(async move {
            let db = context.require_service::<DatabaseConnection>()?;
            let analytics_service = Arc::new(AnalyticsService::new(db));

            context.register_service(analytics_service.clone());
            let analytics_trait: Arc<dyn Analytics> = analytics_service;
            context.register_service(analytics_trait);

            tracing::debug!("Analytics plugin services registered successfully");
            Ok(())
        })
    }

    fn configure_routes(&self, context: &PluginContext) -> Option<PluginRoutes> {
        let analytics_service = context.require_service::<dyn Analytics>().ok()?;
        let app_state = Arc::new(AppState { analytics_service });
        Some(PluginRoutes::new(configure_routes().with_state(app_state)))
    }

    fn openapi_schema(&self) -> Option<OpenApi> {
        Some(AnalyticsApiDoc::openapi())
    }
}
