//! `SeaORM` Entity for events table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use storefront_core::DBDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub session_id: i64,
    pub website_id: i32,
    pub url_path: String,
    pub event_name: String,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub event_data: Option<Json>,
    pub created_at: DBDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::websites::Entity",
        from = "Column::WebsiteId",
        to = "super::websites::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Websites,
    #[sea_orm(
        belongs_to = "super::user_sessions::Entity",
        from = "Column::SessionId",
        to = "super::user_sessions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    UserSessions,
}

impl Related<super::websites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Websites.def()
    }
}

impl Related<super::user_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserSessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
