use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use storefront_core::PaginationParams;
use storefront_entities::types::{ConversationStatus, MessageType, SenderRole};
use storefront_entities::{conversations, messages};
use tracing::{debug, info};

use crate::hub::ChatHub;
use crate::types::{
    ChatEvent, ConversationError, ConversationFilter, ConversationListResponse,
    ConversationResponse, CreateConversationRequest, MessageListResponse, MessageQuery,
    MessageResponse, PostMessageRequest, DEFAULT_MESSAGE_PAGE, MAX_MESSAGE_LENGTH,
    MAX_MESSAGE_PAGE,
};

/// Allowed manual status changes. A closed conversation can be reopened.
pub fn can_transition(from: ConversationStatus, to: ConversationStatus) -> bool {
    use ConversationStatus::*;
    matches!(
        (from, to),
        (Pending, InProgress) | (Pending, Closed) | (InProgress, Closed) | (Closed, InProgress)
    )
}

pub struct ConversationService {
    db: Arc<DatabaseConnection>,
    hub: Arc<ChatHub>,
}

impl ConversationService {
    pub fn new(db: Arc<DatabaseConnection>, hub: Arc<ChatHub>) -> Self {
        Self { db, hub }
    }

    pub async fn create_conversation(
        &self,
        request: CreateConversationRequest,
    ) -> Result<ConversationResponse, ConversationError> {
        let customer_name = request.customer_name.trim();
        if customer_name.is_empty() {
            return Err(ConversationError::Validation(
                "customer_name must not be empty".to_string(),
            ));
        }

        let conversation = conversations::ActiveModel {
            customer_name: Set(customer_name.to_string()),
            customer_email: Set(non_blank(request.customer_email)),
            subject: Set(non_blank(request.subject)),
            status: Set(ConversationStatus::Pending),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!(
            "Opened conversation {} for {}",
            conversation.id, conversation.customer_name
        );
        Ok(conversation.into())
    }

    /// Most recently active first
    pub async fn list_conversations(
        &self,
        filter: ConversationFilter,
    ) -> Result<ConversationListResponse, ConversationError> {
        let (limit, offset) = PaginationParams::new(filter.limit, filter.offset).normalize();

        let mut query = conversations::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(conversations::Column::Status.eq(status));
        }

        let total = query.clone().count(self.db.as_ref()).await?;
        let rows = query
            .order_by_desc(conversations::Column::UpdatedAt)
            .order_by_desc(conversations::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await?;

        Ok(ConversationListResponse {
            conversations: rows.into_iter().map(ConversationResponse::from).collect(),
            total,
            limit,
            offset,
        })
    }

    pub async fn get_conversation(&self, id: i32) -> Result<ConversationResponse, ConversationError> {
        self.find_conversation(id).await.map(Into::into)
    }

    pub async fn update_status(
        &self,
        id: i32,
        next: ConversationStatus,
    ) -> Result<ConversationResponse, ConversationError> {
        let conversation = self.find_conversation(id).await?;
        if !can_transition(conversation.status, next) {
            return Err(ConversationError::InvalidTransition {
                from: conversation.status,
                to: next,
            });
        }

        let now = Utc::now();
        let result = conversations::Entity::update_many()
            .col_expr(conversations::Column::Status, Expr::value(next))
            .col_expr(conversations::Column::UpdatedAt, Expr::value(now))
            .filter(conversations::Column::Id.eq(id))
            .filter(conversations::Column::Status.eq(conversation.status))
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ConversationError::Conflict(id));
        }

        info!("Conversation {} {} -> {}", id, conversation.status, next);
        self.hub
            .publish(
                id,
                ChatEvent::StatusChanged {
                    conversation_id: id,
                    status: next,
                },
            )
            .await;

        Ok(conversations::Model {
            status: next,
            updated_at: now,
            ..conversation
        }
        .into())
    }

    /// Store a message and push it to live subscribers. The first staff
    /// reply to a PENDING conversation moves it to IN_PROGRESS.
    pub async fn post_message(
        &self,
        id: i32,
        request: PostMessageRequest,
    ) -> Result<MessageResponse, ConversationError> {
        let content = validate_content(request.message_type, &request.content)?;

        let conversation = self.find_conversation(id).await?;
        if conversation.status == ConversationStatus::Closed {
            return Err(ConversationError::Closed(id));
        }

        if let Some(reply_to_id) = request.reply_to_id {
            let parent = messages::Entity::find_by_id(reply_to_id)
                .one(self.db.as_ref())
                .await?;
            if parent.map(|m| m.conversation_id) != Some(id) {
                return Err(ConversationError::Validation(format!(
                    "reply_to_id {} is not a message of conversation {}",
                    reply_to_id, id
                )));
            }
        }

        let picks_up = request.sender == SenderRole::Staff
            && conversation.status == ConversationStatus::Pending;
        let now = Utc::now();

        let txn = self.db.begin().await?;

        // The status filters keep a concurrent close from being overtaken
        let mut picked_up = false;
        if picks_up {
            picked_up = conversations::Entity::update_many()
                .col_expr(conversations::Column::UpdatedAt, Expr::value(now))
                .col_expr(
                    conversations::Column::Status,
                    Expr::value(ConversationStatus::InProgress),
                )
                .filter(conversations::Column::Id.eq(id))
                .filter(conversations::Column::Status.eq(ConversationStatus::Pending))
                .exec(&txn)
                .await?
                .rows_affected
                > 0;
        }
        if !picked_up {
            let touched = conversations::Entity::update_many()
                .col_expr(conversations::Column::UpdatedAt, Expr::value(now))
                .filter(conversations::Column::Id.eq(id))
                .filter(conversations::Column::Status.ne(ConversationStatus::Closed))
                .exec(&txn)
                .await?;
            if touched.rows_affected == 0 {
                txn.rollback().await?;
                return Err(ConversationError::Closed(id));
            }
        }

        let message = messages::ActiveModel {
            conversation_id: Set(id),
            sender: Set(request.sender),
            sender_name: Set(non_blank(request.sender_name)),
            message_type: Set(request.message_type),
            content: Set(content),
            reply_to_id: Set(request.reply_to_id),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        let message = MessageResponse::from(message);
        let delivered = self
            .hub
            .publish(
                id,
                ChatEvent::Message {
                    message: message.clone(),
                },
            )
            .await;
        if picked_up {
            info!("Conversation {} picked up by staff", id);
            self.hub
                .publish(
                    id,
                    ChatEvent::StatusChanged {
                        conversation_id: id,
                        status: ConversationStatus::InProgress,
                    },
                )
                .await;
        }

        debug!(
            "Message {} posted to conversation {} ({} live subscribers)",
            message.id, id, delivered
        );
        Ok(message)
    }

    pub async fn list_messages(
        &self,
        id: i32,
        query: MessageQuery,
    ) -> Result<MessageListResponse, ConversationError> {
        self.find_conversation(id).await?;
        let limit = query
            .limit
            .unwrap_or(DEFAULT_MESSAGE_PAGE)
            .clamp(1, MAX_MESSAGE_PAGE);

        let mut select = messages::Entity::find().filter(messages::Column::ConversationId.eq(id));
        if let Some(before) = query.before {
            select = select.filter(messages::Column::Id.lt(before));
        }

        let mut rows = select
            .order_by_desc(messages::Column::Id)
            .limit(limit + 1)
            .all(self.db.as_ref())
            .await?;

        let has_more = rows.len() as u64 > limit;
        rows.truncate(limit as usize);
        rows.reverse();

        Ok(MessageListResponse {
            messages: rows.into_iter().map(MessageResponse::from).collect(),
            has_more,
        })
    }

    async fn find_conversation(&self, id: i32) -> Result<conversations::Model, ConversationError> {
        conversations::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(ConversationError::NotFound(id))
    }
}

fn validate_content(message_type: MessageType, content: &str) -> Result<String, ConversationError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ConversationError::Validation(
            "content must not be empty".to_string(),
        ));
    }
    if content.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(ConversationError::Validation(format!(
            "content exceeds {} characters",
            MAX_MESSAGE_LENGTH
        )));
    }
    if message_type == MessageType::Image
        && !(content.starts_with("https://") || content.starts_with("http://"))
    {
        return Err(ConversationError::Validation(
            "image messages must carry an http(s) URL".to_string(),
        ));
    }
    Ok(content.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Transaction, Value};

    fn conversation(status: ConversationStatus) -> conversations::Model {
        let now = Utc::now();
        conversations::Model {
            id: 4,
            customer_name: "Le Van C".to_string(),
            customer_email: None,
            subject: Some("Doi size".to_string()),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    fn message(id: i64, conversation_id: i32, sender: SenderRole) -> messages::Model {
        messages::Model {
            id,
            conversation_id,
            sender,
            sender_name: None,
            message_type: MessageType::Text,
            content: format!("message {}", id),
            reply_to_id: None,
            created_at: Utc::now(),
        }
    }

    fn text(sender: SenderRole, content: &str, reply_to_id: Option<i64>) -> PostMessageRequest {
        PostMessageRequest {
            sender,
            sender_name: Some(" Lan ".to_string()),
            message_type: MessageType::Text,
            content: content.to_string(),
            reply_to_id,
        }
    }

    fn updated(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn service(db: MockDatabase) -> (ConversationService, Arc<ChatHub>) {
        let hub = Arc::new(ChatHub::new());
        (
            ConversationService::new(Arc::new(db.into_connection()), hub.clone()),
            hub,
        )
    }

    fn log_of(service: ConversationService) -> Vec<Transaction> {
        let Ok(db) = Arc::try_unwrap(service.db) else {
            panic!("connection still shared");
        };
        db.into_transaction_log()
    }

    #[test]
    fn test_status_transitions() {
        use ConversationStatus::*;
        assert!(can_transition(Pending, InProgress));
        assert!(can_transition(Pending, Closed));
        assert!(can_transition(InProgress, Closed));
        assert!(can_transition(Closed, InProgress));

        assert!(!can_transition(InProgress, Pending));
        assert!(!can_transition(Closed, Pending));
        for status in [Pending, InProgress, Closed] {
            assert!(!can_transition(status, status));
        }
    }

    #[test]
    fn test_validate_content() {
        assert_eq!(
            validate_content(MessageType::Text, "  chao shop  ").unwrap(),
            "chao shop"
        );
        assert!(validate_content(MessageType::Text, "   ").is_err());
        assert!(validate_content(MessageType::Text, &"a".repeat(MAX_MESSAGE_LENGTH + 1)).is_err());
        assert!(validate_content(MessageType::Image, "cat.png").is_err());
        assert!(validate_content(MessageType::Image, "https://cdn.example.com/cat.png").is_ok());
    }

    #[tokio::test]
    async fn test_create_conversation_rejects_blank_name_without_query() {
        let (service, _) = service(MockDatabase::new(DatabaseBackend::Postgres));
        let result = service
            .create_conversation(CreateConversationRequest {
                customer_name: "  ".to_string(),
                customer_email: None,
                subject: None,
            })
            .await;

        assert!(matches!(result, Err(ConversationError::Validation(_))));
        assert!(log_of(service).is_empty());
    }

    #[tokio::test]
    async fn test_create_conversation_starts_pending() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![conversation(ConversationStatus::Pending)]]);
        let (service, _) = service(db);

        let created = service
            .create_conversation(CreateConversationRequest {
                customer_name: " Le Van C ".to_string(),
                customer_email: Some("".to_string()),
                subject: Some("Doi size".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(created.status, ConversationStatus::Pending);

        let log = format!("{:?}", log_of(service));
        assert!(log.contains(r#"INSERT INTO "conversations""#));
        assert!(log.contains("Le Van C"));
        assert!(log.contains("PENDING"));
    }

    #[tokio::test]
    async fn test_list_conversations_filters_by_status() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![btreemap! {
                "num_items" => Into::<Value>::into(1i64),
            }]])
            .append_query_results([vec![conversation(ConversationStatus::Pending)]]);
        let (service, _) = service(db);

        let page = service
            .list_conversations(ConversationFilter {
                status: Some(ConversationStatus::Pending),
                limit: Some(500),
                offset: None,
            })
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.limit, 100);
        assert_eq!(page.conversations.len(), 1);

        let log = format!("{:?}", log_of(service));
        assert!(log.contains(r#""conversations"."status" = $1"#));
        assert!(log.contains(r#"ORDER BY "conversations"."updated_at" DESC"#));
    }

    #[tokio::test]
    async fn test_update_status_rejects_invalid_transition() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![conversation(ConversationStatus::InProgress)]]);
        let (service, _) = service(db);

        let result = service.update_status(4, ConversationStatus::Pending).await;
        assert!(matches!(
            result,
            Err(ConversationError::InvalidTransition {
                from: ConversationStatus::InProgress,
                to: ConversationStatus::Pending
            })
        ));
    }

    #[tokio::test]
    async fn test_update_status_reopens_and_notifies_subscribers() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![conversation(ConversationStatus::Closed)]])
            .append_exec_results([updated(1)]);
        let (service, hub) = service(db);
        let mut feed = hub.subscribe(4).await;

        let reopened = service
            .update_status(4, ConversationStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(reopened.status, ConversationStatus::InProgress);
        assert_eq!(
            feed.recv().await.unwrap(),
            ChatEvent::StatusChanged {
                conversation_id: 4,
                status: ConversationStatus::InProgress
            }
        );
    }

    #[tokio::test]
    async fn test_update_status_conflict_when_row_changed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![conversation(ConversationStatus::Pending)]])
            .append_exec_results([updated(0)]);
        let (service, _) = service(db);

        let result = service.update_status(4, ConversationStatus::Closed).await;
        assert!(matches!(result, Err(ConversationError::Conflict(4))));
    }

    #[tokio::test]
    async fn test_post_message_to_closed_conversation_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![conversation(ConversationStatus::Closed)]]);
        let (service, _) = service(db);

        let result = service
            .post_message(4, text(SenderRole::Customer, "con hang khong?", None))
            .await;
        assert!(matches!(result, Err(ConversationError::Closed(4))));
    }

    #[tokio::test]
    async fn test_post_message_reply_must_belong_to_conversation() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![conversation(ConversationStatus::InProgress)]])
            .append_query_results([vec![message(30, 99, SenderRole::Customer)]]);
        let (service, _) = service(db);

        let result = service
            .post_message(4, text(SenderRole::Staff, "Da co hang", Some(30)))
            .await;
        assert!(matches!(result, Err(ConversationError::Validation(_))));
    }

    #[tokio::test]
    async fn test_first_staff_reply_picks_up_pending_conversation() {
        let stored = messages::Model {
            reply_to_id: Some(30),
            sender_name: Some("Lan".to_string()),
            ..message(31, 4, SenderRole::Staff)
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![conversation(ConversationStatus::Pending)]])
            .append_query_results([vec![message(30, 4, SenderRole::Customer)]])
            .append_query_results([vec![stored.clone()]])
            .append_exec_results([updated(1)]);
        let (service, hub) = service(db);
        let mut feed = hub.subscribe(4).await;

        let posted = service
            .post_message(4, text(SenderRole::Staff, " Da co hang ", Some(30)))
            .await
            .unwrap();
        assert_eq!(posted.id, 31);
        assert_eq!(posted.reply_to_id, Some(30));

        assert_eq!(
            feed.recv().await.unwrap(),
            ChatEvent::Message {
                message: MessageResponse::from(stored)
            }
        );
        assert_eq!(
            feed.recv().await.unwrap(),
            ChatEvent::StatusChanged {
                conversation_id: 4,
                status: ConversationStatus::InProgress
            }
        );

        let log = format!("{:?}", log_of(service));
        assert!(log.contains(r#"INSERT INTO "messages""#));
        assert!(log.contains("Da co hang"));
        assert!(log.contains(r#"UPDATE "conversations" SET"#));
        assert!(log.contains("IN_PROGRESS"));
    }

    #[tokio::test]
    async fn test_post_message_loses_race_with_close() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![conversation(ConversationStatus::InProgress)]])
            .append_exec_results([updated(0)]);
        let (service, hub) = service(db);
        let mut feed = hub.subscribe(4).await;

        let result = service
            .post_message(4, text(SenderRole::Customer, "Con o do khong?", None))
            .await;
        assert!(matches!(result, Err(ConversationError::Closed(4))));
        assert!(feed.try_recv().is_err());

        let log = format!("{:?}", log_of(service));
        assert!(log.contains(r#""conversations"."status" <> "#));
        assert!(log.contains("ROLLBACK"));
        assert!(!log.contains(r#"INSERT INTO "messages""#));
    }

    #[tokio::test]
    async fn test_staff_reply_after_concurrent_close_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![conversation(ConversationStatus::Pending)]])
            .append_exec_results([updated(0), updated(0)]);
        let (service, _) = service(db);

        let result = service
            .post_message(4, text(SenderRole::Staff, "Da co hang", None))
            .await;
        assert!(matches!(result, Err(ConversationError::Closed(4))));
    }

    #[tokio::test]
    async fn test_customer_message_keeps_status() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![conversation(ConversationStatus::Pending)]])
            .append_query_results([vec![message(32, 4, SenderRole::Customer)]])
            .append_exec_results([updated(1)]);
        let (service, hub) = service(db);
        let mut feed = hub.subscribe(4).await;

        service
            .post_message(4, text(SenderRole::Customer, "Alo", None))
            .await
            .unwrap();

        assert!(matches!(
            feed.recv().await.unwrap(),
            ChatEvent::Message { .. }
        ));
        assert!(feed.try_recv().is_err());
        let log = format!("{:?}", log_of(service));
        assert!(!log.contains("IN_PROGRESS"));
    }

    #[tokio::test]
    async fn test_list_messages_pages_backwards_oldest_first() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![conversation(ConversationStatus::InProgress)]])
            .append_query_results([vec![
                message(19, 4, SenderRole::Customer),
                message(18, 4, SenderRole::Staff),
                message(17, 4, SenderRole::Customer),
            ]]);
        let (service, _) = service(db);

        let page = service
            .list_messages(
                4,
                MessageQuery {
                    limit: Some(2),
                    before: Some(20),
                },
            )
            .await
            .unwrap();
        assert!(page.has_more);
        let ids: Vec<i64> = page.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![18, 19]);

        let log = format!("{:?}", log_of(service));
        assert!(log.contains(r#""messages"."id" < $2"#));
        assert!(log.contains(r#"ORDER BY "messages"."id" DESC"#));
    }

    #[tokio::test]
    async fn test_list_messages_unknown_conversation() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<conversations::Model>::new()]);
        let (service, _) = service(db);

        let result = service.list_messages(404, MessageQuery::default()).await;
        assert!(matches!(result, Err(ConversationError::NotFound(404))));
    }
}
