use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use storefront_core::DBDateTime;

use crate::types::{MessageType, SenderRole};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub conversation_id: i32,
    pub sender: SenderRole,
    pub sender_name: Option<String>,
    pub message_type: MessageType,
    pub content: String,
    pub reply_to_id: Option<i64>,
    pub created_at: DBDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::conversations::Entity",
        from = "Column::ConversationId",
        to = "super::conversations::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Conversations,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ReplyToId",
        to = "Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    ReplyTo,
}

impl Related<super::conversations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Conversations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
