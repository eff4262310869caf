use thiserror::Error;

/// Errors raised by the article and author store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] turso::Error),
    #[error("Failed to connect to storage: {0}")]
    Connection(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflicts with an existing record: {0}")]
    Conflict(String),
    #[error("Stored data is invalid: {0}")]
    InvalidData(String),
}
