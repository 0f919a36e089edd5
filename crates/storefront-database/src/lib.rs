//! Database connection management

pub use sea_orm;
mod connection;

pub use connection::{establish_connection, DbConnection, MigrationMode};

// Shared by the integration tests of the service crates
pub mod test_utils;
