//! Checkout orders: creation, the shipping/payment lifecycle, per-viewer
//! action lists and SePay bank-transfer confirmation.

pub mod handlers;
pub mod lifecycle;
pub mod plugin;
pub mod services;
pub mod types;

pub use handlers::{configure_routes, AppState, CommerceApiDoc};
pub use lifecycle::{available_actions, OrderAction, Viewer};
pub use plugin::CommercePlugin;
pub use services::{OrderReferenceParser, OrderService, SepayService};
pub use types::*;
