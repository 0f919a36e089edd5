//! Tracking ingestion: visitor sessions, page views, custom events and the
//! daily device counters, plus website registration.

pub mod channel;
pub mod handlers;
pub mod plugin;
pub mod services;
pub mod types;
pub mod user_agent;

pub use handlers::{configure_routes, AppState, TrackingApiDoc};
pub use plugin::TrackingPlugin;
pub use services::{session_hash, SessionOutcome, TrackingService, WebsiteService};
pub use types::*;
