use serde::{Deserialize, Serialize};
use storefront_core::UtcDateTime;
use storefront_entities::types::{ConversationStatus, MessageType, SenderRole};
use storefront_entities::{conversations, messages};
use thiserror::Error;
use utoipa::ToSchema;

pub const MAX_MESSAGE_LENGTH: usize = 4000;
pub const DEFAULT_MESSAGE_PAGE: u64 = 50;
pub const MAX_MESSAGE_PAGE: u64 = 200;

#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("Conversation {0} not found")]
    NotFound(i32),
    #[error("Invalid message: {0}")]
    Validation(String),
    #[error("Cannot change conversation status from {from} to {to}")]
    InvalidTransition {
        from: ConversationStatus,
        to: ConversationStatus,
    },
    #[error("Conversation {0} is closed")]
    Closed(i32),
    #[error("Conversation {0} was modified concurrently")]
    Conflict(i32),
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateConversationRequest {
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConversationFilter {
    pub status: Option<ConversationStatus>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateConversationStatusRequest {
    pub status: ConversationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostMessageRequest {
    pub sender: SenderRole,
    /// Display name of the customer or staff member
    pub sender_name: Option<String>,
    pub message_type: MessageType,
    /// Text body, or the image URL for `IMAGE` messages
    pub content: String,
    pub reply_to_id: Option<i64>,
}

/// Cursor page of messages. `before` is a message id; the page holds the
/// messages immediately preceding it.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MessageQuery {
    pub limit: Option<u64>,
    pub before: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversationResponse {
    pub id: i32,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub subject: Option<String>,
    pub status: ConversationStatus,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: UtcDateTime,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: UtcDateTime,
}

impl From<conversations::Model> for ConversationResponse {
    fn from(conversation: conversations::Model) -> Self {
        Self {
            id: conversation.id,
            customer_name: conversation.customer_name,
            customer_email: conversation.customer_email,
            subject: conversation.subject,
            status: conversation.status,
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationResponse>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub id: i64,
    pub conversation_id: i32,
    pub sender: SenderRole,
    pub sender_name: Option<String>,
    pub message_type: MessageType,
    pub content: String,
    pub reply_to_id: Option<i64>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: UtcDateTime,
}

impl From<messages::Model> for MessageResponse {
    fn from(message: messages::Model) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            sender: message.sender,
            sender_name: message.sender_name,
            message_type: message.message_type,
            content: message.content,
            reply_to_id: message.reply_to_id,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageListResponse {
    /// Oldest first
    pub messages: Vec<MessageResponse>,
    /// More messages exist before the first one returned
    pub has_more: bool,
}

/// Frame pushed to WebSocket subscribers of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChatEvent {
    Message {
        message: MessageResponse,
    },
    StatusChanged {
        conversation_id: i32,
        status: ConversationStatus,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_chat_event_wire_format() {
        let created_at = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        let event = ChatEvent::Message {
            message: MessageResponse {
                id: 11,
                conversation_id: 3,
                sender: SenderRole::Staff,
                sender_name: Some("Lan".to_string()),
                message_type: MessageType::Text,
                content: "Xin chao".to_string(),
                reply_to_id: Some(10),
                created_at,
            },
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "message");
        assert_eq!(json["message"]["sender"], "STAFF");
        assert_eq!(json["message"]["message_type"], "TEXT");
        assert_eq!(json["message"]["reply_to_id"], 10);

        let status = ChatEvent::StatusChanged {
            conversation_id: 3,
            status: ConversationStatus::Closed,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["event"], "status_changed");
        assert_eq!(json["status"], "CLOSED");
    }
}
