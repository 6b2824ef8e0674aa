//! In-memory provider implementation.

use async_trait::async_trait;
use dashmap::DashMap;
use entity_search_shared::{Document, DocumentQuery, QueryResults, RangePage, RangeRequest};
use tracing::debug;

use super::matcher;
use crate::config::MAX_DELETE_PAGE_SIZE;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;

/// Number of documents returned when a query sets no limit.
pub const DEFAULT_QUERY_LIMIT: usize = 20;

/// Search engine that keeps every index in memory.
///
/// Documents keep their insertion order, which is also the result order of
/// unsorted queries. Replacing a document keeps its position.
#[derive(Debug, Default)]
pub struct MemorySearchProvider {
    indices: DashMap<String, Vec<Document>>,
}

impl MemorySearchProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stored document, by index and id.
    pub fn document(&self, index: &str, id: &str) -> Option<Document> {
        self.indices
            .get(index)
            .and_then(|docs| docs.iter().find(|d| d.id == id).cloned())
    }

    pub fn document_count(&self, index: &str) -> usize {
        self.indices.get(index).map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn has_index(&self, index: &str) -> bool {
        self.indices.contains_key(index)
    }
}

#[async_trait]
impl SearchIndexProvider for MemorySearchProvider {
    async fn ensure_index_exists(&self, index: &str) -> Result<(), SearchIndexError> {
        self.indices.entry(index.to_string()).or_default();
        Ok(())
    }

    async fn put_documents(
        &self,
        index: &str,
        documents: &[Document],
    ) -> Result<(), SearchIndexError> {
        let mut stored = self.indices.entry(index.to_string()).or_default();
        for document in documents {
            match stored.iter_mut().find(|d| d.id == document.id) {
                Some(existing) => *existing = document.clone(),
                None => stored.push(document.clone()),
            }
        }
        debug!(index = %index, count = documents.len(), "Stored documents");
        Ok(())
    }

    async fn delete_documents(&self, index: &str, ids: &[String]) -> Result<(), SearchIndexError> {
        if let Some(mut stored) = self.indices.get_mut(index) {
            stored.retain(|d| !ids.contains(&d.id));
        }
        Ok(())
    }

    async fn query(
        &self,
        index: &str,
        query: &DocumentQuery,
    ) -> Result<QueryResults, SearchIndexError> {
        let mut matched: Vec<Document> = self
            .indices
            .get(index)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matcher::matches(d, &query.clauses))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let total_matches = matched.len() as u64;
        matcher::sort_documents(&mut matched, &query.sort);
        matched.truncate(query.limit.unwrap_or(DEFAULT_QUERY_LIMIT));

        Ok(QueryResults::new(total_matches, matched))
    }

    async fn get_range(
        &self,
        index: &str,
        request: &RangeRequest,
    ) -> Result<RangePage, SearchIndexError> {
        if request.limit > MAX_DELETE_PAGE_SIZE {
            return Err(SearchIndexError::batch_size_exceeded(
                request.limit,
                MAX_DELETE_PAGE_SIZE,
            ));
        }
        let ids = self
            .indices
            .get(index)
            .map(|docs| docs.iter().take(request.limit).map(|d| d.id.clone()).collect())
            .unwrap_or_default();
        Ok(RangePage { ids })
    }
}
