use database_layer::DatabaseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("History payload serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Table '{0}' is not registered")]
    TableNotFound(String),

    #[error("History storage error: {0}")]
    StorageError(#[from] DatabaseError),

    #[error("History worker is not running")]
    QueueClosed,
}

pub type Result<T> = std::result::Result<T, AuditError>;
