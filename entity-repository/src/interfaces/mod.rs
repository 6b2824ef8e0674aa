//! This module defines and re-exports the interfaces of the entity repository.
mod entity_store;
mod reindex_operation;

pub use entity_store::EntityStore;
pub use reindex_operation::ReindexOperation;
