//! Handle joining the store half and the index half of a write.

use entity_search_repository::IndexOperation;
use tokio::task::JoinHandle;

use crate::errors::{RepositoryError, StoreError};

type StoreTask<T> = JoinHandle<Result<T, StoreError>>;

enum StoreSlot<T> {
    Done(T),
    Pending(StoreTask<T>),
}

/// A write to both the store and the search index.
///
/// Either half may still be running in the background. [`complete`] waits
/// for the store first, then the index, and hands back the written value.
/// Dropping the handle leaves both halves running.
///
/// [`complete`]: PendingWrite::complete
#[must_use = "failures are only reported by `complete()`"]
pub struct PendingWrite<T> {
    store: StoreSlot<T>,
    index: IndexOperation,
}

impl<T> PendingWrite<T> {
    /// The store write already finished with `value`.
    pub(crate) fn stored(value: T, index: IndexOperation) -> Self {
        Self {
            store: StoreSlot::Done(value),
            index,
        }
    }

    pub(crate) fn pending(store: StoreTask<T>, index: IndexOperation) -> Self {
        Self {
            store: StoreSlot::Pending(store),
            index,
        }
    }

    /// Whether either half is still outstanding.
    pub fn is_pending(&self) -> bool {
        matches!(self.store, StoreSlot::Pending(_)) || self.index.is_pending()
    }

    /// Wait for both halves.
    ///
    /// A store failure is reported as [`RepositoryError::StoreWrite`] without
    /// waiting for the index. An index failure is reported as
    /// [`RepositoryError::IndexWrite`].
    pub async fn complete(self) -> Result<T, RepositoryError> {
        let value = match self.store {
            StoreSlot::Done(value) => value,
            StoreSlot::Pending(task) => match task.await {
                Ok(result) => result.map_err(RepositoryError::StoreWrite)?,
                Err(e) => {
                    return Err(RepositoryError::StoreWrite(StoreError::backend(format!(
                        "store task failed: {e}"
                    ))))
                }
            },
        };
        self.index
            .complete()
            .await
            .map_err(RepositoryError::IndexWrite)?;
        Ok(value)
    }
}
