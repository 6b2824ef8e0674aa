//! In-process entity store.
mod entity_store;

pub use entity_store::MemoryEntityStore;
