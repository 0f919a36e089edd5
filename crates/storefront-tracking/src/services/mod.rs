mod tracking_service;
mod website_service;

pub use tracking_service::{session_hash, SessionOutcome, TrackingService};
pub use website_service::WebsiteService;
