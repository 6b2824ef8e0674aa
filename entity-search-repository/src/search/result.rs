use std::marker::PhantomData;

use entity_search_shared::{Document, Entity, QueryResults};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::errors::{SearchError, SearchIndexError};

type QueryTask = JoinHandle<Result<QueryResults, SearchIndexError>>;

/// The outcome of a submitted search.
///
/// The query runs in the background from the moment the result is created.
/// The first accessor call waits for it; later calls reuse the outcome,
/// including a failure.
///
/// When the request had an offset, the engine was asked for `limit + offset`
/// documents. The first `offset` of them are skipped here.
pub struct SearchResult<E> {
    task: Option<QueryTask>,
    outcome: Option<Result<QueryResults, SearchError>>,
    offset: usize,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> SearchResult<E> {
    pub(crate) fn pending(task: QueryTask, offset: usize) -> Self {
        Self {
            task: Some(task),
            outcome: None,
            offset,
            _entity: PhantomData,
        }
    }

    /// A result over documents that were already fetched.
    pub fn from_results(results: QueryResults, offset: usize) -> Self {
        Self {
            task: None,
            outcome: Some(Ok(results)),
            offset,
            _entity: PhantomData,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    async fn results(&mut self) -> Result<&QueryResults, SearchError> {
        if let Some(task) = self.task.take() {
            let outcome = match task.await {
                Ok(result) => result.map_err(SearchError::Query),
                Err(e) => Err(SearchError::Query(SearchIndexError::unknown(format!(
                    "search task failed: {e}"
                )))),
            };
            if let Ok(results) = &outcome {
                debug!(
                    kind = E::kind(),
                    total = results.total_matches,
                    returned = results.documents.len(),
                    "Search completed"
                );
            }
            self.outcome = Some(outcome);
        }
        match &self.outcome {
            Some(Ok(results)) => Ok(results),
            Some(Err(e)) => Err(e.clone()),
            None => Err(SearchError::Query(SearchIndexError::unknown(
                "search was never submitted",
            ))),
        }
    }

    async fn window(&mut self) -> Result<&[Document], SearchError> {
        let offset = self.offset;
        let documents = &self.results().await?.documents;
        Ok(&documents[offset.min(documents.len())..])
    }

    /// Total number of documents matching the query.
    pub async fn matching_record_count(&mut self) -> Result<u64, SearchError> {
        Ok(self.results().await?.total_matches)
    }

    /// Matching documents remaining after the offset.
    pub async fn returned_record_count(&mut self) -> Result<u64, SearchError> {
        let offset = self.offset as u64;
        Ok(self.results().await?.total_matches.saturating_sub(offset))
    }

    /// Document ids of the returned window, in engine order.
    pub async fn search_result_ids(&mut self) -> Result<Vec<String>, SearchError> {
        Ok(self
            .window()
            .await?
            .iter()
            .map(|doc| doc.id.clone())
            .collect())
    }

    /// Entities rebuilt from the indexed fields of the returned window.
    ///
    /// Only indexed fields with a setter are populated. Everything else keeps
    /// its `Default` value.
    pub async fn search_results(&mut self) -> Result<Vec<E>, SearchError> {
        let accessors = E::accessors();
        Ok(self
            .window()
            .await?
            .iter()
            .map(|doc| {
                let mut entity = E::default();
                for (name, value) in doc.to_values() {
                    accessors.write(&mut entity, &name, value);
                }
                entity
            })
            .collect())
    }

    /// Continuation cursor reported by the engine, if any.
    pub async fn cursor(&mut self) -> Result<Option<String>, SearchError> {
        Ok(self.results().await?.cursor.clone())
    }
}
