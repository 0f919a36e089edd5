use std::sync::Arc;

use sea_orm::DatabaseConnection;
use storefront_config::ConfigService;
use storefront_core::plugin::{
    PluginContext, PluginError, PluginFuture, PluginRoutes, ServiceRegistrationContext,
    StorefrontPlugin,
};
use tracing::{debug, warn};
use utoipa::{openapi::OpenApi, OpenApi as OpenApiTrait};

use crate::handlers::{configure_routes, AppState, CommerceApiDoc};
use crate::services::{OrderReferenceParser, OrderService, SepayService, ORDER_REFERENCE_PREFIX};

/// Provides `OrderService` and `SepayService`.
/// Requires `DatabaseConnection` and `ConfigService`.
pub struct CommercePlugin;

impl StorefrontPlugin for CommercePlugin {
    fn name(&self) -> &'static str {
        "commerce"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> PluginFuture<'a> {
        Box::pin(async move {
            let db = context.require_service::<DatabaseConnection>()?;
            let config = context.require_service::<ConfigService>()?;

            let parser = OrderReferenceParser::new(ORDER_REFERENCE_PREFIX)
                .map_err(|e| PluginError::InitializationFailed(e.to_string()))?;
            let api_key = config.sepay_api_key().map(str::to_string);
            if api_key.is_none() {
                warn!("No SePay API key configured, payment webhook will refuse all calls");
            }

            let order_service = Arc::new(OrderService::new(db));
            context.register_service(Arc::new(SepayService::new(
                order_service.clone(),
                parser,
                api_key,
            )));
            context.register_service(order_service);

            debug!("Commerce plugin services registered");
            Ok(())
        })
    }

    fn configure_routes(&self, context: &PluginContext) -> Option<PluginRoutes> {
        let state = Arc::new(AppState {
            order_service: context.require_service::<OrderService>().ok()?,
            sepay_service: context.require_service::<SepayService>().ok()?,
        });
        Some(PluginRoutes::new(configure_routes().with_state(state)))
    }

    fn openapi_schema(&self) -> Option<OpenApi> {
        Some(CommerceApiDoc::openapi())
    }
}
