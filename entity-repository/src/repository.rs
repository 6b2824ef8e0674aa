//! The entity repository: store writes paired with search index writes.

use std::sync::Arc;

use entity_search_repository::{
    id_to_string, parse_entity_ids, IndexOperation, SearchError, SearchIndexService,
    SearchRequest,
};
use entity_search_shared::{Document, Entity, Value};
use tracing::{debug, info, instrument, warn};

use crate::errors::{RepositoryError, StoreError};
use crate::interfaces::{EntityStore, ReindexOperation};
use crate::pending_write::PendingWrite;

/// Typed access to entities of one kind.
///
/// Entities live in an [`EntityStore`]. The fields named at construction are
/// projected into the search index on every save and removed on delete. The
/// two writes are not atomic: each half reports its own failure through
/// [`PendingWrite::complete`].
///
/// A repository with no searchable fields never touches the index.
///
/// # Example
///
/// ```ignore
/// let repository = Repository::new(store, search_service, ["name", "price"])?;
///
/// let saved = repository.save(Product::new("Lamp", 15.5)).await?.complete().await?;
/// let request = repository.search()?.field("price").less_than(20);
/// let products = repository.complete_search(&request).await?;
/// ```
pub struct Repository<E: Entity> {
    store: Arc<dyn EntityStore<E>>,
    search: SearchIndexService,
    fields: Arc<Vec<String>>,
}

impl<E: Entity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            search: self.search.clone(),
            fields: Arc::clone(&self.fields),
        }
    }
}

impl<E: Entity> Repository<E> {
    /// Creates a repository indexing `fields` of `E`.
    ///
    /// Every field must be registered in `E::accessors()`; dotted paths are
    /// accepted. The type is registered with the search service, which drops
    /// anything it cached about it.
    pub fn new<I>(
        store: Arc<dyn EntityStore<E>>,
        search: SearchIndexService,
        fields: I,
    ) -> Result<Self, RepositoryError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        let accessors = E::accessors();
        if let Some(unknown) = fields.iter().find(|f| !accessors.contains(f)) {
            return Err(RepositoryError::configuration(format!(
                "{} has no field '{}' to index",
                E::kind(),
                unknown
            )));
        }

        search.register::<E>();
        debug!(kind = E::kind(), fields = ?fields, "Created repository");

        Ok(Self {
            store,
            search,
            fields: Arc::new(fields),
        })
    }

    pub fn fields_to_index(&self) -> &[String] {
        &self.fields
    }

    pub fn search_service(&self) -> &SearchIndexService {
        &self.search
    }

    /// Saves one entity. See [`save_all`](Self::save_all).
    pub async fn save(&self, entity: E) -> Result<PendingWrite<E>, RepositoryError> {
        self.write(vec![entity], first).await
    }

    /// Saves entities to the store and indexes them.
    ///
    /// Documents are built before anything is written, so a document build
    /// failure is returned with nothing persisted, whether or not the
    /// entities have ids.
    ///
    /// When any entity has no id, the store write is awaited here so the
    /// assigned ids can be indexed, and only the index write is left pending.
    /// Otherwise both writes run in the background. The returned handle
    /// yields the entities, with their ids, once both writes finish.
    pub async fn save_all(&self, entities: Vec<E>) -> Result<PendingWrite<Vec<E>>, RepositoryError> {
        self.write(entities, |entities| entities).await
    }

    async fn write<T>(
        &self,
        entities: Vec<E>,
        finish: fn(Vec<E>) -> T,
    ) -> Result<PendingWrite<T>, RepositoryError>
    where
        T: Send + 'static,
    {
        if entities.is_empty() {
            return Ok(PendingWrite::stored(finish(entities), IndexOperation::completed()));
        }

        let documents = self.build_documents(&entities)?;

        if entities.iter().any(|entity| entity.id().is_none()) {
            let (entities, index) = self.store_then_index(entities, documents).await?;
            return Ok(PendingWrite::stored(finish(entities), index));
        }

        let index = self.search.put_documents::<E>(documents);
        let store = Arc::clone(&self.store);
        let task = tokio::spawn(async move {
            store.save(&entities).await?;
            Ok::<T, StoreError>(finish(entities))
        });
        Ok(PendingWrite::pending(task, index))
    }

    /// Awaits the store write, then starts the index write under the
    /// assigned ids.
    async fn store_then_index(
        &self,
        mut entities: Vec<E>,
        mut documents: Vec<Document>,
    ) -> Result<(Vec<E>, IndexOperation), RepositoryError> {
        self.save_to_store(&mut entities)
            .await
            .map_err(RepositoryError::StoreWrite)?;
        for (document, entity) in documents.iter_mut().zip(&entities) {
            if let Some(id) = entity.id() {
                document.id = id_to_string(id);
            }
        }
        Ok((entities, self.search.put_documents::<E>(documents)))
    }

    /// Saves to the store and writes the assigned ids back.
    async fn save_to_store(&self, entities: &mut [E]) -> Result<(), StoreError> {
        let ids = self.store.save(entities).await?;
        if ids.len() != entities.len() {
            return Err(StoreError::id_mismatch(entities.len(), ids.len()));
        }
        for (entity, id) in entities.iter_mut().zip(ids) {
            entity.set_id(id);
        }
        Ok(())
    }

    /// Documents for every entity, or none when no fields are indexed.
    /// Entities without an id get an empty document id.
    fn build_documents(&self, entities: &[E]) -> Result<Vec<Document>, SearchError> {
        if self.fields.is_empty() {
            return Ok(Vec::new());
        }
        let entries = entities.iter().map(|entity| {
            let id = entity.id().map(id_to_string).unwrap_or_default();
            (id, entity)
        });
        self.search.build_documents(entries, &self.fields)
    }

    fn index_entities(&self, entities: &[E]) -> Result<IndexOperation, SearchError> {
        let documents = self.build_documents(entities)?;
        Ok(self.search.put_documents::<E>(documents))
    }

    pub async fn load(&self, id: i64) -> Result<Option<E>, RepositoryError> {
        Ok(self.store.get(&[id]).await?.remove(&id))
    }

    /// Loads entities by id. The result lines up with `ids`, with `None`
    /// where the store has no entity.
    pub async fn load_many(&self, ids: &[i64]) -> Result<Vec<Option<E>>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let found = self.store.get(ids).await?;
        Ok(ids.iter().map(|id| found.get(id).cloned()).collect())
    }

    /// The first `count` entities in the store.
    pub async fn list(&self, count: usize) -> Result<Vec<E>, RepositoryError> {
        Ok(self.store.limit(count).await?)
    }

    pub async fn load_by_field(
        &self,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<E>, RepositoryError> {
        self.load_by_field_values(field, vec![value.into()]).await
    }

    /// Entities whose `field` equals any of `values`, filtered by the store.
    pub async fn load_by_field_values(
        &self,
        field: &str,
        values: Vec<Value>,
    ) -> Result<Vec<E>, RepositoryError> {
        if values.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.filter_by_field(field, &values).await?)
    }

    /// Starts a search over the indexed fields.
    pub fn search(&self) -> Result<SearchRequest<E>, RepositoryError> {
        if self.fields.is_empty() {
            return Err(RepositoryError::configuration(format!(
                "{} has no searchable fields",
                E::kind()
            )));
        }
        Ok(self.search.search::<E>())
    }

    /// Runs the search and loads the matching entities from the store, in
    /// search order. Matches the store no longer has are skipped.
    pub async fn complete_search(
        &self,
        request: &SearchRequest<E>,
    ) -> Result<Vec<E>, RepositoryError> {
        let ids = self.complete_id_search(request).await?;
        Ok(self.load_many(&ids).await?.into_iter().flatten().collect())
    }

    /// Runs the search and returns the matching entity ids, in search order.
    pub async fn complete_id_search(
        &self,
        request: &SearchRequest<E>,
    ) -> Result<Vec<i64>, RepositoryError> {
        let document_ids = request.search().search_result_ids().await?;
        Ok(parse_entity_ids(&document_ids))
    }

    /// Deletes one entity by id. See [`delete_ids`](Self::delete_ids).
    pub fn delete(&self, id: i64) -> PendingWrite<()> {
        self.delete_ids(vec![id])
    }

    /// Deletes from the store and the index concurrently.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, since both deletes are
    /// spawned.
    pub fn delete_ids(&self, ids: Vec<i64>) -> PendingWrite<()> {
        if ids.is_empty() {
            return PendingWrite::stored((), IndexOperation::completed());
        }
        let index = if self.fields.is_empty() {
            IndexOperation::completed()
        } else {
            self.search
                .remove::<E>(ids.iter().map(|id| id_to_string(*id)).collect())
        };
        let store = Arc::clone(&self.store);
        let task = tokio::spawn(async move { store.delete(&ids).await });
        PendingWrite::pending(task, index)
    }

    pub fn delete_entity(&self, entity: &E) -> PendingWrite<()> {
        self.delete_entities(std::slice::from_ref(entity))
    }

    /// Deletes entities by id. Entities without an id are skipped.
    pub fn delete_entities(&self, entities: &[E]) -> PendingWrite<()> {
        self.delete_ids(entities.iter().filter_map(Entity::id).collect())
    }

    /// Re-indexes every entity the request matches, `batch_size` at a time.
    ///
    /// Without a limit on the request, the search is capped at the service's
    /// maximum query limit. When `transform` is given, each batch is passed
    /// through it and whatever it returns is saved back to the store before
    /// being indexed. Each batch's index write is awaited before the next
    /// batch starts.
    ///
    /// Returns the number of entities indexed.
    #[instrument(skip(self, request, transform), fields(request = %request))]
    pub async fn reindex(
        &self,
        request: &SearchRequest<E>,
        batch_size: usize,
        transform: Option<&dyn ReindexOperation<E>>,
    ) -> Result<usize, RepositoryError> {
        if batch_size == 0 {
            return Err(RepositoryError::configuration(
                "reindex batch size must be at least 1",
            ));
        }

        let capped = request.requested_limit().is_none();
        let request = if capped {
            request
                .clone()
                .limit(self.search.config().max_query_limit)
        } else {
            request.clone()
        };
        let mut result = request.search();
        let ids = parse_entity_ids(&result.search_result_ids().await?);
        let matching = result.matching_record_count().await?;
        if capped && matching > ids.len() as u64 {
            warn!(
                kind = E::kind(),
                matching,
                returned = ids.len(),
                "Reindex capped at the query limit, later matches are skipped"
            );
        }
        let entities: Vec<E> = self.load_many(&ids).await?.into_iter().flatten().collect();
        let total = entities.len();
        let mut scanned = 0;
        let mut reindexed = 0;

        let mut remaining = entities.into_iter();
        loop {
            let batch: Vec<E> = remaining.by_ref().take(batch_size).collect();
            if batch.is_empty() {
                break;
            }
            scanned += batch.len();

            let (batch, index) = match transform {
                Some(operation) => {
                    let batch = operation.apply(batch);
                    let documents = self.build_documents(&batch)?;
                    if batch.is_empty() {
                        (batch, IndexOperation::completed())
                    } else {
                        self.store_then_index(batch, documents).await?
                    }
                }
                None => {
                    let index = self.index_entities(&batch)?;
                    (batch, index)
                }
            };

            index.complete().await.map_err(RepositoryError::IndexWrite)?;
            reindexed += batch.len();

            info!(
                kind = E::kind(),
                scanned,
                total,
                reindexed,
                "Reindexed batch"
            );
        }

        Ok(reindexed)
    }
}

fn first<E: Default>(entities: Vec<E>) -> E {
    entities.into_iter().next().unwrap_or_default()
}
