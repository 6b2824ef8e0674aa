//! Search index provider trait definition.
//!
//! This module defines the abstract interface for document search engines,
//! allowing for different backend implementations (OpenSearch, in-memory, etc.).

use async_trait::async_trait;
use entity_search_shared::{Document, DocumentQuery, QueryResults, RangePage, RangeRequest};

use crate::errors::SearchIndexError;

/// Abstracts the underlying document search engine.
///
/// Every entity kind has its own index, named by the caller. Implementations
/// are shared by `SearchIndexService` behind an `Arc` and called from spawned
/// tasks, so they must be `Send + Sync`.
///
/// All methods return `Result<T, SearchIndexError>` for consistent error handling across
/// different backend implementations.
///
/// # Index Initialization
///
/// Backends that need an index to exist before documents are written should
/// create it in `ensure_index_exists`, which is idempotent.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Ensure the named index exists, creating it if necessary.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index is ready for use
    /// * `Err(SearchIndexError)` - If initialization fails
    async fn ensure_index_exists(&self, index: &str) -> Result<(), SearchIndexError>;

    /// Add or replace documents, keyed by document id.
    ///
    /// # Arguments
    ///
    /// * `index` - The target index
    /// * `documents` - Documents to write; an existing document with the same id is replaced
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If every document was written
    /// * `Err(SearchIndexError)` - If the write fails for any document
    async fn put_documents(&self, index: &str, documents: &[Document])
        -> Result<(), SearchIndexError>;

    /// Delete documents by id. Ids that are not in the index are ignored.
    ///
    /// # Arguments
    ///
    /// * `index` - The target index
    /// * `ids` - Document ids to remove
    async fn delete_documents(&self, index: &str, ids: &[String]) -> Result<(), SearchIndexError>;

    /// Run a query against the index.
    ///
    /// # Arguments
    ///
    /// * `index` - The index to search
    /// * `query` - The rendered query, its clause tree, sort expressions and limit
    ///
    /// # Returns
    ///
    /// * `Ok(QueryResults)` - Matching documents in engine order plus the total match count
    /// * `Err(SearchIndexError)` - If the query fails
    async fn query(&self, index: &str, query: &DocumentQuery)
        -> Result<QueryResults, SearchIndexError>;

    /// Fetch a page of document ids without their fields.
    ///
    /// Used to sweep an index. Callers keep `request.limit` at or below 200.
    async fn get_range(
        &self,
        index: &str,
        request: &RangeRequest,
    ) -> Result<RangePage, SearchIndexError>;
}
