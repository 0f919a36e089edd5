mod conversation_handler;
mod socket_handler;

use std::sync::Arc;

use axum::routing::{get, patch};
use axum::Router;
use utoipa::OpenApi;

use crate::hub::ChatHub;
use crate::services::ConversationService;
use crate::types::{
    ChatEvent, ConversationListResponse, ConversationResponse, CreateConversationRequest,
    MessageListResponse, MessageResponse, PostMessageRequest, UpdateConversationStatusRequest,
};

pub use conversation_handler::{
    create_conversation, get_conversation, list_conversations, list_messages, post_message,
    update_conversation_status,
};
pub use socket_handler::conversation_socket;

pub struct AppState {
    pub conversation_service: Arc<ConversationService>,
    pub hub: Arc<ChatHub>,
}

pub fn configure_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/conversations",
            get(list_conversations).post(create_conversation),
        )
        .route("/conversations/{id}", get(get_conversation))
        .route(
            "/conversations/{id}/status",
            patch(update_conversation_status),
        )
        .route(
            "/conversations/{id}/messages",
            get(list_messages).post(post_message),
        )
        .route("/conversations/{id}/ws", get(conversation_socket))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        conversation_handler::list_conversations,
        conversation_handler::create_conversation,
        conversation_handler::get_conversation,
        conversation_handler::update_conversation_status,
        conversation_handler::list_messages,
        conversation_handler::post_message,
        socket_handler::conversation_socket,
    ),
    components(schemas(
        CreateConversationRequest,
        ConversationResponse,
        ConversationListResponse,
        UpdateConversationStatusRequest,
        PostMessageRequest,
        MessageResponse,
        MessageListResponse,
        ChatEvent,
        storefront_entities::types::ConversationStatus,
        storefront_entities::types::MessageType,
        storefront_entities::types::SenderRole,
    )),
    tags((name = "Chat", description = "Customer-support conversations"))
)]
pub struct ChatApiDoc;
