//! Plugin system for service registration and route composition
//!
//! Each feature crate ships a [`StorefrontPlugin`] that registers its services
//! into a shared [`ServiceRegistry`] and contributes a router plus an OpenAPI
//! document. [`PluginManager`] initializes plugins in registration order, so a
//! plugin may only depend on services of plugins registered before it.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

use axum::Router;
use thiserror::Error;
use tracing::debug;
use utoipa::openapi::OpenApi;

pub use axum;
pub use utoipa;

use crate::openapi;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Plugin '{plugin_name}' failed to register services: {error}")]
    PluginRegistrationFailed { plugin_name: String, error: String },

    #[error("Service '{service}' is required but not registered")]
    ServiceNotFound { service: &'static str },

    #[error("Plugin initialization failed: {0}")]
    InitializationFailed(String),
}

pub type PluginFuture<'a> = Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + 'a>>;

pub trait StorefrontPlugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Register the services this plugin provides.
    ///
    /// Dependencies are looked up with `context.require_service::<T>()`.
    fn register_services<'a>(&'a self, context: &'a ServiceRegistrationContext)
        -> PluginFuture<'a>;

    /// HTTP routes, nested under `/api` by the manager
    fn configure_routes(&self, _context: &PluginContext) -> Option<PluginRoutes> {
        None
    }

    fn openapi_schema(&self) -> Option<OpenApi> {
        None
    }
}

pub struct PluginRoutes {
    pub router: Router,
}

impl PluginRoutes {
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

/// Type-keyed service registry
pub struct ServiceRegistry {
    services: RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            services: RwLock::new(HashMap::new()),
        }
    }

    pub fn register<T: Send + Sync + 'static + ?Sized>(&self, service: Arc<T>) {
        debug!("Registering service: {}", std::any::type_name::<T>());
        self.services
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(TypeId::of::<T>(), Box::new(service));
    }

    pub fn get<T: Send + Sync + 'static + ?Sized>(&self) -> Option<Arc<T>> {
        self.services
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&TypeId::of::<T>())
            .and_then(|any| any.downcast_ref::<Arc<T>>())
            .cloned()
    }

    pub fn require<T: Send + Sync + 'static + ?Sized>(&self) -> Result<Arc<T>, PluginError> {
        self.get::<T>().ok_or(PluginError::ServiceNotFound {
            service: std::any::type_name::<T>(),
        })
    }
}

/// Read-only view handed to `configure_routes`
pub struct PluginContext {
    registry: Arc<ServiceRegistry>,
}

impl PluginContext {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self { registry }
    }

    pub fn get_service<T: Send + Sync + 'static + ?Sized>(&self) -> Option<Arc<T>> {
        self.registry.get::<T>()
    }

    pub fn require_service<T: Send + Sync + 'static + ?Sized>(
        &self,
    ) -> Result<Arc<T>, PluginError> {
        self.registry.require::<T>()
    }
}

/// Mutable view handed to `register_services`
pub struct ServiceRegistrationContext {
    registry: Arc<ServiceRegistry>,
}

impl Default for ServiceRegistrationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceRegistrationContext {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ServiceRegistry::new()),
        }
    }

    pub fn register_service<T: Send + Sync + 'static + ?Sized>(&self, service: Arc<T>) {
        self.registry.register(service);
    }

    pub fn get_service<T: Send + Sync + 'static + ?Sized>(&self) -> Option<Arc<T>> {
        self.registry.get::<T>()
    }

    pub fn require_service<T: Send + Sync + 'static + ?Sized>(
        &self,
    ) -> Result<Arc<T>, PluginError> {
        self.registry.require::<T>()
    }

    pub fn create_plugin_context(&self) -> PluginContext {
        PluginContext::new(self.registry.clone())
    }
}

pub struct PluginManager {
    plugins: Vec<Box<dyn StorefrontPlugin>>,
    context: ServiceRegistrationContext,
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginManager {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            context: ServiceRegistrationContext::new(),
        }
    }

    pub fn register_plugin(&mut self, plugin: Box<dyn StorefrontPlugin>) {
        debug!("Registering plugin: {}", plugin.name());
        self.plugins.push(plugin);
    }

    pub fn service_context(&self) -> &ServiceRegistrationContext {
        &self.context
    }

    pub async fn initialize_plugins(&mut self) -> Result<(), PluginError> {
        debug!("Initializing {} plugins", self.plugins.len());

        for plugin in &self.plugins {
            plugin.register_services(&self.context).await.map_err(|e| {
                PluginError::PluginRegistrationFailed {
                    plugin_name: plugin.name().to_string(),
                    error: e.to_string(),
                }
            })?;
            debug!("Initialized plugin: {}", plugin.name());
        }

        Ok(())
    }

    /// Merge every plugin router under `/api`
    pub fn build_application(&self) -> Router {
        let plugin_context = self.context.create_plugin_context();
        let mut api_router = Router::new();

        for plugin in &self.plugins {
            if let Some(routes) = plugin.configure_routes(&plugin_context) {
                debug!("Adding routes for plugin: {}", plugin.name());
                api_router = api_router.merge(routes.router);
            }
        }

        Router::new().nest("/api", api_router)
    }

    pub fn unified_openapi(&self) -> OpenApi {
        self.plugins
            .iter()
            .filter_map(|plugin| plugin.openapi_schema())
            .fold(openapi::base_document(), openapi::merge)
    }
}
