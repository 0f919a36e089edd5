mod handler;
pub mod plugin;
mod service;

pub use handler::{configure_routes, SettingsApiDoc, SettingsResponse, SettingsState};
pub use plugin::ConfigPlugin;
pub use service::{
    ConfigService, ConfigServiceError, ServerConfig, DEFAULT_ADDRESS, DEFAULT_SESSION_WINDOW_MINUTES,
};
