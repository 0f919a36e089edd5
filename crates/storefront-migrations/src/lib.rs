//! Database migrations for the Storefront backend

mod migration;

pub use migration::Migrator;
pub use sea_orm_migration::prelude::*;
