//! Search index service implementation.
//!
//! This module provides the main service for keeping entity documents in the
//! search index and querying them. Repositories use it to index entities on
//! save, remove them on delete and run searches.

use std::sync::Arc;

use entity_search_shared::{Document, DocumentQuery, Entity, RangeRequest, SortExpression};
use tracing::{debug, info, instrument, warn};

use crate::config::SearchIndexServiceConfig;
use crate::document_builder::build_document;
use crate::errors::{SearchError, SearchIndexError};
use crate::index_operation::IndexOperation;
use crate::interfaces::SearchIndexProvider;
use crate::numeric_cache::NumericFieldCache;
use crate::search::{SearchRequest, SearchResult};

/// The main service for interacting with the search index.
///
/// This is the high-level API that application code should use. It turns
/// entities into documents, delegates to a `SearchIndexProvider` for the actual
/// backend operations, and hands back pending handles for the asynchronous
/// ones.
///
/// The service is cheap to clone; clones share the provider and the numeric
/// field cache.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use entity_search_repository::{OpenSearchProvider, SearchIndexService};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = OpenSearchProvider::new("http://localhost:9200").await?;
/// let service = SearchIndexService::new(Arc::new(provider));
///
/// let removed = service.remove_all_of_kind("Product").await?;
/// println!("removed {removed} documents");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SearchIndexService {
    provider: Arc<dyn SearchIndexProvider>,
    config: Arc<SearchIndexServiceConfig>,
    numeric_fields: Arc<NumericFieldCache>,
}

impl SearchIndexService {
    /// Create a new SearchIndexService with default configuration.
    ///
    /// # Arguments
    ///
    /// * `provider` - A shared implementation of `SearchIndexProvider` (e.g., `OpenSearchProvider`)
    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self::with_config(provider, SearchIndexServiceConfig::default())
    }

    /// Create a new SearchIndexService with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `provider` - A shared implementation of `SearchIndexProvider` (e.g., `OpenSearchProvider`)
    /// * `config` - Custom configuration for the service. The delete page size
    ///   is clamped to what the engine accepts.
    pub fn with_config(
        provider: Arc<dyn SearchIndexProvider>,
        config: SearchIndexServiceConfig,
    ) -> Self {
        let page_size = config.delete_page_size;
        Self {
            provider,
            config: Arc::new(config.with_delete_page_size(page_size)),
            numeric_fields: Arc::new(NumericFieldCache::new()),
        }
    }

    pub fn config(&self) -> &SearchIndexServiceConfig {
        &self.config
    }

    /// Name of the index that holds documents of `kind`.
    pub fn index_name(&self, kind: &str) -> String {
        self.config.index_name(kind)
    }

    /// Declare an entity type to the service.
    ///
    /// Drops any cached field information for the type, so a type whose
    /// fields changed is picked up again.
    pub fn register<E: Entity>(&self) {
        self.numeric_fields.invalidate_kind(E::kind());
        debug!(kind = E::kind(), "Registered entity type");
    }

    /// Make sure the index for the entity kind exists.
    pub async fn ensure_index_for_kind(&self, kind: &str) -> Result<(), SearchIndexError> {
        let index = self.index_name(kind);
        self.provider.ensure_index_exists(&index).await?;
        info!(index = %index, "Search index ready");
        Ok(())
    }

    /// Index one entity under `id`, projecting the named fields.
    ///
    /// Document build failures are returned immediately. The write itself runs
    /// in the background.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, since the write is spawned.
    pub fn index<E: Entity>(
        &self,
        entity: &E,
        id: &str,
        fields: &[String],
    ) -> Result<IndexOperation, SearchError> {
        let document = build_document(entity, id, fields)?;
        Ok(self.put(E::kind(), vec![document]))
    }

    /// Index several entities in one write, in iteration order.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, since the write is spawned.
    pub fn index_batch<'a, E, I>(
        &self,
        entities: I,
        fields: &[String],
    ) -> Result<IndexOperation, SearchError>
    where
        E: Entity,
        I: IntoIterator<Item = (String, &'a E)>,
    {
        let documents = self.build_documents(entities, fields)?;
        Ok(self.put_documents::<E>(documents))
    }

    /// Build the documents for several entities without writing them.
    pub fn build_documents<'a, E, I>(
        &self,
        entities: I,
        fields: &[String],
    ) -> Result<Vec<Document>, SearchError>
    where
        E: Entity,
        I: IntoIterator<Item = (String, &'a E)>,
    {
        entities
            .into_iter()
            .map(|(id, entity)| build_document(entity, &id, fields))
            .collect()
    }

    /// Write documents of `E` built earlier, in the background.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, since the write is spawned.
    pub fn put_documents<E: Entity>(&self, documents: Vec<Document>) -> IndexOperation {
        if documents.is_empty() {
            return IndexOperation::completed();
        }
        self.put(E::kind(), documents)
    }

    fn put(&self, kind: &str, documents: Vec<Document>) -> IndexOperation {
        let provider = Arc::clone(&self.provider);
        let index = self.index_name(kind);
        debug!(index = %index, count = documents.len(), "Indexing documents");
        IndexOperation::pending(tokio::spawn(async move {
            provider.put_documents(&index, &documents).await
        }))
    }

    /// Remove documents of `E` by id, in the background.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, since the delete is spawned.
    pub fn remove<E: Entity>(&self, ids: Vec<String>) -> IndexOperation {
        self.remove_from_kind(E::kind(), ids)
    }

    /// Remove documents of an entity kind by id, in the background.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, since the delete is spawned.
    pub fn remove_from_kind(&self, kind: &str, ids: Vec<String>) -> IndexOperation {
        if ids.is_empty() {
            return IndexOperation::completed();
        }
        let provider = Arc::clone(&self.provider);
        let index = self.index_name(kind);
        debug!(index = %index, count = ids.len(), "Removing documents");
        IndexOperation::pending(tokio::spawn(async move {
            provider.delete_documents(&index, &ids).await
        }))
    }

    /// Remove every document of `E`. Returns the number removed.
    pub async fn remove_all<E: Entity>(&self) -> Result<usize, SearchError> {
        self.remove_all_of_kind(E::kind()).await
    }

    /// Remove every document in the index of `kind`.
    ///
    /// Sweeps the index one page of ids at a time until a page comes back
    /// empty. A failed page stops the sweep; the error carries the number of
    /// documents removed before it.
    #[instrument(skip(self))]
    pub async fn remove_all_of_kind(&self, kind: &str) -> Result<usize, SearchError> {
        let index = self.index_name(kind);
        let request = RangeRequest::ids(self.config.delete_page_size);
        let mut removed = 0;

        loop {
            let page = self
                .provider
                .get_range(&index, &request)
                .await
                .map_err(|source| SearchError::RemoveAll { removed, source })?;
            if page.is_empty() {
                break;
            }
            self.provider
                .delete_documents(&index, &page.ids)
                .await
                .map_err(|source| SearchError::RemoveAll { removed, source })?;
            removed += page.len();
            debug!(index = %index, removed, "Removed page of documents");
        }

        info!(index = %index, removed, "Removed all documents");
        Ok(removed)
    }

    /// Start a search over the index of `E`.
    pub fn search<E: Entity>(&self) -> SearchRequest<E> {
        SearchRequest::new(self.clone())
    }

    /// Submit a request to the engine and wrap the pending query.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, since the query is spawned.
    pub fn create_search_result<E: Entity>(&self, request: &SearchRequest<E>) -> SearchResult<E> {
        let index = self.index_name(E::kind());
        let offset = request.requested_offset().unwrap_or(0);

        let sort = request
            .sorts()
            .iter()
            .map(|sort| {
                if self.is_numeric_field::<E>(&sort.field) {
                    SortExpression::numeric(sort)
                } else {
                    SortExpression::text(sort)
                }
            })
            .collect();

        let limit = request.requested_limit().map(|limit| {
            let effective = limit.saturating_add(offset);
            if effective > self.config.max_query_limit {
                warn!(
                    index = %index,
                    limit = effective,
                    max = self.config.max_query_limit,
                    "Query limit exceeds what the engine will return"
                );
            }
            effective
        });

        let query = DocumentQuery::new(request.clauses().to_vec())
            .with_sort(sort)
            .with_limit(limit);
        debug!(index = %index, query = %query.query, limit = ?limit, "Submitting search");

        let provider = Arc::clone(&self.provider);
        let task = tokio::spawn(async move { provider.query(&index, &query).await });
        SearchResult::pending(task, offset)
    }

    /// Whether a field of `E` holds numbers, for choosing sort defaults.
    ///
    /// Accepts registered names and their encoded forms. Unknown fields are
    /// not numeric.
    pub fn is_numeric_field<E: Entity>(&self, field: &str) -> bool {
        self.numeric_fields.is_numeric(E::kind(), field, || {
            E::accessors()
                .kind_of(field)
                .is_some_and(|kind| kind.is_numeric())
        })
    }

    pub fn numeric_field_cache(&self) -> &NumericFieldCache {
        &self.numeric_fields
    }
}
