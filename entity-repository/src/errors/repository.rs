//! Errors returned by `Repository`.
use entity_search_repository::SearchError;
use thiserror::Error;

use super::StoreError;

/// Represents errors that can occur within the repository.
///
/// Write failures are split by slot: `StoreWrite` when the store half of a
/// pending write failed, `IndexWrite` when the index half did. Direct reads
/// and searches report `Store` and `Search`.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The repository was used in a way its setup does not allow.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Store write failed: {0}")]
    StoreWrite(#[source] StoreError),

    #[error("Index write failed: {0}")]
    IndexWrite(#[source] SearchError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),
}

impl RepositoryError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
