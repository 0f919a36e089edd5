//! Startup errors shared by the infrastructure crates

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Could not connect to database: {0}")]
    Database(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
