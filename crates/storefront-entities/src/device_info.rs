//! `SeaORM` Entity for device_info table
//!
//! Daily counter keyed by (website_id, browser, os, device, date). Writes go
//! through a raw `INSERT ... ON CONFLICT` upsert, never through this model.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "device_info")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub website_id: i32,
    pub browser: String,
    pub os: String,
    pub device: String,
    pub date: Date,
    pub count: i64,
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
}

impl Related<super::websites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Websites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
