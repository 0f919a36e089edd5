pub mod analytics;
pub mod requests;
pub mod responses;

pub use analytics::*;
