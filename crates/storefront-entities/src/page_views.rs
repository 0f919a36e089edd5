//! `SeaORM` Entity for page_views table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use storefront_core::DBDateTime;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "page_views")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Surrogate id of the owning `user_sessions` row
    pub session_id: i64,
    pub website_id: i32,

    pub url_path: String,
    pub url_query: Option<String>,
    pub page_title: Option<String>,

    pub referrer_path: Option<String>,
    pub referrer_query: Option<String>,
    pub referrer_domain: Option<String>,

    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_content: Option<String>,
    pub utm_term: Option<String>,

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
