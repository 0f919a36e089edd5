use std::sync::Arc;

use sea_orm::DatabaseConnection;
use storefront_config::ConfigService;
use storefront_core::plugin::{
    PluginContext, PluginFuture, PluginRoutes, ServiceRegistrationContext, StorefrontPlugin,
};
use tracing::debug;
use utoipa::{openapi::OpenApi, OpenApi as OpenApiTrait};

use crate::handlers::{configure_routes, AppState, TrackingApiDoc};
use crate::services::{TrackingService, WebsiteService};

/// Provides `TrackingService` and `WebsiteService`.
/// Requires `DatabaseConnection` and `ConfigService`.
pub struct TrackingPlugin;

impl StorefrontPlugin for TrackingPlugin {
    fn name(&self) -> &'static str {
        "tracking"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> PluginFuture<'a> {
        Box::pin(async move {
            let db = context.require_service::<DatabaseConnection>()?;
            let config = context.require_service::<ConfigService>()?;

            context.register_service(Arc::new(TrackingService::new(
                db.clone(),
                config.session_window(),
            )));
            context.register_service(Arc::new(WebsiteService::new(db)));

            debug!(
                "Tracking plugin registered (session window {:?})",
                config.session_window()
            );
            Ok(())
        })
    }

    fn configure_routes(&self, context: &PluginContext) -> Option<PluginRoutes> {
        let state = Arc::new(AppState {
            tracking_service: context.require_service::<TrackingService>().ok()?,
            website_service: context.require_service::<WebsiteService>().ok()?,
            db: context.require_service::<DatabaseConnection>().ok()?,
        });
        Some(PluginRoutes::new(configure_routes().with_state(state)))
    }

    fn openapi_schema(&self) -> Option<OpenApi> {
        Some(TrackingApiDoc::openapi())
    }
}
