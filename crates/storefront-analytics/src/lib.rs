pub mod analytics;
pub mod handler;
pub mod plugin;
pub mod traits;
pub mod types;

pub use analytics::AnalyticsService;
pub use plugin::AnalyticsPlugin;
pub use traits::Analytics;
pub use types::*;
