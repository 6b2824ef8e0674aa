//! This module defines the `EntityStore` trait, the contract of the primary
//! keyed store behind a repository.
use std::collections::HashMap;

use entity_search_shared::{Entity, Value};

use crate::errors::StoreError;

/// A keyed store of entities of one type.
///
/// The store owns id generation. Implementations must be safe to share across
/// tasks since repository writes run in the background.
#[async_trait::async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Saves the entities, assigning ids to those without one.
    ///
    /// # Returns
    ///
    /// The id of every entity, in input order.
    async fn save(&self, entities: &[E]) -> Result<Vec<i64>, StoreError>;

    /// Loads the entities with the given ids. Missing ids are absent from the map.
    async fn get(&self, ids: &[i64]) -> Result<HashMap<i64, E>, StoreError>;

    /// Deletes the entities with the given ids. Missing ids are ignored.
    async fn delete(&self, ids: &[i64]) -> Result<(), StoreError>;

    /// Entities whose `field` equals any of `values`.
    async fn filter_by_field(&self, field: &str, values: &[Value]) -> Result<Vec<E>, StoreError>;

    /// The first `count` entities.
    async fn limit(&self, count: usize) -> Result<Vec<E>, StoreError>;
}
