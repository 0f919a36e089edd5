use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use storefront_core::DatabaseConfig;
use thiserror::Error;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:4000";
pub const DEFAULT_SESSION_WINDOW_MINUTES: u32 = 30;

#[derive(Error, Debug)]
pub enum ConfigServiceError {
    #[error("Invalid configuration: {details}")]
    InvalidConfiguration { details: String },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub address: String,
    pub database_url: String,

    /// Requests from the same visitor hash within this window reuse the session
    pub session_window_minutes: u32,
    /// Allowed origins for the tracker script; `*` allows any
    pub cors_origins: Vec<String>,
    /// Expected `Authorization: Apikey <key>` on the SePay webhook
    pub sepay_api_key: Option<String>,

    pub postgres_max_connections: u32,
    pub postgres_min_connections: u32,
    pub postgres_connect_timeout_secs: u64,
    pub postgres_acquire_timeout_secs: u64,
    pub postgres_idle_timeout_secs: u64,
}

impl ServerConfig {
    /// Build a config with defaults, taking pool settings from the process environment
    pub fn new(address: String, database_url: String) -> Result<Self, ConfigServiceError> {
        Self::with_env(address, database_url, |key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::new`] with a custom variable lookup
    pub fn with_env<F>(
        address: String,
        database_url: String,
        lookup: F,
    ) -> Result<Self, ConfigServiceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse_u32 = |key: &str, default: u32| {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        };
        let parse_u64 = |key: &str, default: u64| {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        };

        let config = ServerConfig {
            address,
            database_url,
            session_window_minutes: DEFAULT_SESSION_WINDOW_MINUTES,
            cors_origins: vec!["*".to_string()],
            sepay_api_key: None,
            postgres_max_connections: parse_u32("STOREFRONT_POSTGRES_MAX_CONNECTIONS", 100),
            postgres_min_connections: parse_u32("STOREFRONT_POSTGRES_MIN_CONNECTIONS", 5),
            postgres_connect_timeout_secs: parse_u64("STOREFRONT_POSTGRES_CONNECT_TIMEOUT", 30),
            postgres_acquire_timeout_secs: parse_u64("STOREFRONT_POSTGRES_ACQUIRE_TIMEOUT", 30),
            postgres_idle_timeout_secs: parse_u64("STOREFRONT_POSTGRES_IDLE_TIMEOUT", 600),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_session_window_minutes(mut self, minutes: u32) -> Result<Self, ConfigServiceError> {
        self.session_window_minutes = minutes;
        self.validate()?;
        Ok(self)
    }

    /// Accepts a comma separated list; empty entries are ignored
    pub fn with_cors_origins(mut self, origins: &str) -> Self {
        let parsed: Vec<String> = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
        if !parsed.is_empty() {
            self.cors_origins = parsed;
        }
        self
    }

    pub fn with_sepay_api_key(mut self, key: Option<String>) -> Self {
        self.sepay_api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    fn validate(&self) -> Result<(), ConfigServiceError> {
        if self.address.parse::<SocketAddr>().is_err() {
            return Err(ConfigServiceError::InvalidConfiguration {
                details: format!("'{}' is not a valid listen address", self.address),
            });
        }
        if self.database_url.trim().is_empty() {
            return Err(ConfigServiceError::InvalidConfiguration {
                details: "database url must not be empty".to_string(),
            });
        }
        if self.session_window_minutes == 0 {
            return Err(ConfigServiceError::InvalidConfiguration {
                details: "session window must be at least one minute".to_string(),
            });
        }
        if self.postgres_min_connections > self.postgres_max_connections {
            return Err(ConfigServiceError::InvalidConfiguration {
                details: format!(
                    "postgres min connections ({}) exceeds max connections ({})",
                    self.postgres_min_connections, self.postgres_max_connections
                ),
            });
        }
        Ok(())
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database_url.clone(),
            max_connections: self.postgres_max_connections,
            min_connections: self.postgres_min_connections,
            connect_timeout_secs: self.postgres_connect_timeout_secs,
            acquire_timeout_secs: self.postgres_acquire_timeout_secs,
            idle_timeout_secs: self.postgres_idle_timeout_secs,
        }
    }
}

/// Read access to the running configuration for other plugins
pub struct ConfigService {
    config: Arc<ServerConfig>,
}

impl ConfigService {
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self { config }
    }

    pub fn get_server_config(&self) -> Arc<ServerConfig> {
        self.config.clone()
    }

    pub fn session_window(&self) -> Duration {
        Duration::from_secs(u64::from(self.config.session_window_minutes) * 60)
    }

    pub fn sepay_api_key(&self) -> Option<&str> {
        self.config.sepay_api_key.as_deref()
    }
}
