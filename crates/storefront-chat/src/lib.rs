//! Customer-support chat: conversations with a status lifecycle, threaded
//! messages and a per-conversation WebSocket feed of new messages.

pub mod handlers;
pub mod hub;
pub mod plugin;
pub mod services;
pub mod types;

pub use handlers::{configure_routes, AppState, ChatApiDoc};
pub use hub::ChatHub;
pub use plugin::ChatPlugin;
pub use services::{can_transition, ConversationService};
pub use types::*;
