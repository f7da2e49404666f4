//! Error types shared by the storage and drag-library seams.

use thiserror::Error;

use crate::widget::WidgetId;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage corruption: {0}")]
    Corruption(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Failures reported by a drag library while the engine drives it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("grid is not initialized")]
    NotInitialized,

    #[error("grid instance was destroyed")]
    Destroyed,

    #[error("no grid node for widget {0}")]
    NodeNotFound(WidgetId),

    #[error("invalid grid options: {0}")]
    InvalidOptions(String),
}
