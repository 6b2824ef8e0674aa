use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use entity_search_shared::{Entity, Value};
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::StoreError;
use crate::interfaces::EntityStore;

/// An `EntityStore` kept in memory, ordered by id.
///
/// Ids are generated from a counter starting at 1. Saving an entity with an
/// explicit id moves the counter past it.
pub struct MemoryEntityStore<E> {
    entities: RwLock<BTreeMap<i64, E>>,
    next_id: AtomicI64,
}

impl<E: Entity> MemoryEntityStore<E> {
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }
}

impl<E: Entity> Default for MemoryEntityStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn value_matches(stored: &Value, wanted: &Value) -> bool {
    match stored {
        Value::List(items) => items.contains(wanted),
        _ => stored == wanted,
    }
}

#[async_trait]
impl<E: Entity> EntityStore<E> for MemoryEntityStore<E> {
    async fn save(&self, entities: &[E]) -> Result<Vec<i64>, StoreError> {
        let mut stored = self.entities.write().await;
        let mut ids = Vec::with_capacity(entities.len());
        for entity in entities {
            let mut entity = entity.clone();
            let id = match entity.id() {
                Some(id) => {
                    self.next_id.fetch_max(id.saturating_add(1), Ordering::SeqCst);
                    id
                }
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                    entity.set_id(id);
                    id
                }
            };
            stored.insert(id, entity);
            ids.push(id);
        }
        debug!(kind = E::kind(), count = ids.len(), "Saved entities");
        Ok(ids)
    }

    async fn get(&self, ids: &[i64]) -> Result<HashMap<i64, E>, StoreError> {
        let stored = self.entities.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| stored.get(id).map(|entity| (*id, entity.clone())))
            .collect())
    }

    async fn delete(&self, ids: &[i64]) -> Result<(), StoreError> {
        let mut stored = self.entities.write().await;
        for id in ids {
            stored.remove(id);
        }
        Ok(())
    }

    async fn filter_by_field(&self, field: &str, values: &[Value]) -> Result<Vec<E>, StoreError> {
        let accessors = E::accessors();
        if !accessors.contains(field) {
            return Err(StoreError::unsupported(format!(
                "{} has no field '{}'",
                E::kind(),
                field
            )));
        }
        let stored = self.entities.read().await;
        Ok(stored
            .values()
            .filter(|entity| {
                accessors
                    .read(entity, field)
                    .is_some_and(|value| values.iter().any(|wanted| value_matches(&value, wanted)))
            })
            .cloned()
            .collect())
    }

    async fn limit(&self, count: usize) -> Result<Vec<E>, StoreError> {
        let stored = self.entities.read().await;
        Ok(stored.values().take(count).cloned().collect())
    }
}
