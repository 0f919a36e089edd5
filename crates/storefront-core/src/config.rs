//! Configuration types shared by the database and HTTP layers

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection pool settings for the analytics database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 100,
            min_connections: 5,
            connect_timeout_secs: 30,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

/// Limit/offset pagination used by list endpoints
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            limit: Some(DEFAULT_PAGE_SIZE),
            offset: Some(0),
        }
    }
}

pub const DEFAULT_PAGE_SIZE: u64 = 50;
pub const MAX_PAGE_SIZE: u64 = 100;

impl PaginationParams {
    pub fn new(limit: Option<u64>, offset: Option<u64>) -> Self {
        Self { limit, offset }
    }

    /// Clamp to `1..=MAX_PAGE_SIZE` and default the offset to zero
    pub fn normalize(self) -> (u64, u64) {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        (limit, self.offset.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        assert_eq!(PaginationParams::default().normalize(), (50, 0));
        assert_eq!(PaginationParams::new(None, None).normalize(), (50, 0));
    }

    #[test]
    fn test_pagination_clamps_limit() {
        assert_eq!(PaginationParams::new(Some(0), Some(10)).normalize(), (1, 10));
        assert_eq!(PaginationParams::new(Some(500), None).normalize(), (100, 0));
    }

    #[test]
    fn test_database_config_defaults() {
        let config = DatabaseConfig::new("postgres://localhost/storefront");
        assert_eq!(config.max_connections, 100);
        assert_eq!(config.min_connections, 5);
        assert_eq!(config.idle_timeout(), Duration::from_secs(600));
    }
}
