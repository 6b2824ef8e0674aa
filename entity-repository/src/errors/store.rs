use thiserror::Error;

/// Represents errors that can occur within an entity store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Store backend error: {0}")]
    Backend(String),

    /// The store returned a different number of ids than entities it was given.
    #[error("Store returned {returned} ids for {expected} entities")]
    IdMismatch { expected: usize, returned: usize },

    #[error("Unsupported store operation: {0}")]
    Unsupported(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn id_mismatch(expected: usize, returned: usize) -> Self {
        Self::IdMismatch { expected, returned }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }
}
