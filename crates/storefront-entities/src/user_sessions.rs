//! `SeaORM` Entity for user_sessions table
//!
//! `session_id` is the deterministic visitor hash; several rows may share it
//! once the dedup window has elapsed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use storefront_core::DBDateTime;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub session_id: String,
    pub website_id: i32,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub device: Option<String>,
    pub distinct_id: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub language: Option<String>,
    pub screen: Option<String>,
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
    #[sea_orm(has_many = "super::page_views::Entity")]
    PageViews,
    #[sea_orm(has_many = "super::events::Entity")]
    Events,
}

impl Related<super::websites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Websites.def()
    }
}

impl Related<super::page_views::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PageViews.def()
    }
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
