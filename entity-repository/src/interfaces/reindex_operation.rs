use entity_search_shared::Entity;

/// A transformation applied to each batch during a reindex.
///
/// The returned entities are saved back to the store and indexed. Entities
/// left out of the returned batch are neither saved nor indexed.
pub trait ReindexOperation<E: Entity>: Send + Sync {
    fn apply(&self, batch: Vec<E>) -> Vec<E>;
}

impl<E, F> ReindexOperation<E> for F
where
    E: Entity,
    F: Fn(Vec<E>) -> Vec<E> + Send + Sync,
{
    fn apply(&self, batch: Vec<E>) -> Vec<E> {
        self(batch)
    }
}
