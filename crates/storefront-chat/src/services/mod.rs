mod conversation_service;

pub use conversation_service::{can_transition, ConversationService};
