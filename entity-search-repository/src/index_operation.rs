//! Handle for a document write or delete running in the background.

use tokio::task::JoinHandle;

use crate::errors::{SearchError, SearchIndexError};

type IndexTask = JoinHandle<Result<(), SearchIndexError>>;

/// A spawned index write or delete.
///
/// The work runs whether or not the handle is awaited. Dropping it detaches
/// the task; failures are only observed through [`IndexOperation::complete`].
#[must_use = "failures are only reported by `complete()`"]
#[derive(Debug)]
pub struct IndexOperation {
    task: Option<IndexTask>,
}

impl IndexOperation {
    pub(crate) fn pending(task: IndexTask) -> Self {
        Self { task: Some(task) }
    }

    /// An operation with nothing left to do.
    pub fn completed() -> Self {
        Self { task: None }
    }

    pub fn is_pending(&self) -> bool {
        self.task.is_some()
    }

    /// Wait for the operation and report its outcome.
    pub async fn complete(self) -> Result<(), SearchError> {
        let Some(task) = self.task else {
            return Ok(());
        };
        match task.await {
            Ok(result) => result.map_err(SearchError::Index),
            Err(e) => Err(SearchError::Index(SearchIndexError::unknown(format!(
                "index task failed: {e}"
            )))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completed_is_ok() {
        let op = IndexOperation::completed();
        assert!(!op.is_pending());
        assert!(op.complete().await.is_ok());
    }

    #[tokio::test]
    async fn test_pending_reports_backend_error() {
        let op = IndexOperation::pending(tokio::spawn(async {
            Err::<(), _>(SearchIndexError::index("rejected"))
        }));
        assert!(op.is_pending());

        let err = op.complete().await.unwrap_err();
        assert!(matches!(
            err,
            SearchError::Index(SearchIndexError::IndexError(_))
        ));
    }

    #[tokio::test]
    async fn test_panicking_task_is_reported() {
        let explode = true;
        let op = IndexOperation::pending(tokio::spawn(async move {
            if explode {
                panic!("backend exploded");
            }
            Ok::<(), SearchIndexError>(())
        }));

        let err = op.complete().await.unwrap_err();
        assert!(matches!(err, SearchError::Index(SearchIndexError::Unknown(_))));
    }
}
