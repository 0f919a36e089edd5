use std::sync::Arc;

use sea_orm::DatabaseConnection;
use storefront_core::plugin::{
    PluginContext, PluginFuture, PluginRoutes, ServiceRegistrationContext, StorefrontPlugin,
};
use utoipa::{openapi::OpenApi, OpenApi as OpenApiTrait};

use crate::handlers::{configure_routes, AppState, ChatApiDoc};
use crate::hub::ChatHub;
use crate::services::ConversationService;

/// Provides `ChatHub` and `ConversationService`. Requires `DatabaseConnection`.
pub struct ChatPlugin;

impl StorefrontPlugin for ChatPlugin {
    fn name(&self) -> &'static str {
        "chat"
    }

    fn register_services<'a>(
        &'a self,
        context: &'a ServiceRegistrationContext,
    ) -> PluginFuture<'a> {
        Box::pin(async move {
            let db = context.require_service::<DatabaseConnection>()?;
            let hub = Arc::new(ChatHub::new());

            context.register_service(hub.clone());
            context.register_service(Arc::new(ConversationService::new(db, hub)));

            tracing::debug!("Chat plugin services registered");
            Ok(())
        })
    }

    fn configure_routes(&self, context: &PluginContext) -> Option<PluginRoutes> {
        let state = Arc::new(AppState {
            conversation_service: context.require_service::<ConversationService>().ok()?,
            hub: context.require_service::<ChatHub>().ok()?,
        });
        Some(PluginRoutes::new(configure_routes().with_state(state)))
    }

    fn openapi_schema(&self) -> Option<OpenApi> {
        Some(ChatApiDoc::openapi())
    }
}
