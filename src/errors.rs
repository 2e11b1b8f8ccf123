//! Error types for messaging and storage operations

use thiserror::Error;

/// Errors that can occur while talking to the message broker
#[derive(Debug, Error)]
pub enum MessagingError {
    /// NATS connection error
    #[error("NATS connection error: {0}")]
    NatsConnection(String),

    /// Publish error
    #[error("Publish error: {0}")]
    Publish(String),

    /// Subscribe error
    #[error("Subscribe error: {0}")]
    Subscribe(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// No reply arrived before the exchange deadline
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Nobody is listening on the request subject
    #[error("No responders on subject: {0}")]
    NoResponders(String),
}

/// Result type for messaging operations
pub type MessagingResult<T> = Result<T, MessagingError>;

impl From<serde_json::Error> for MessagingError {
    fn from(err: serde_json::Error) -> Self {
        MessagingError::Serialization(err.to_string())
    }
}

/// Errors raised by a resource repository backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend rejected or failed the operation
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// A stored document could not be mapped to a resource
    #[error("Corrupt resource document: {0}")]
    Corrupt(String),
}

/// Result type for repository operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for StorageError {
    fn from(err: mongodb::error::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}
