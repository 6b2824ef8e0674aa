//! # Entity Repository
//! This crate provides a typed repository that writes entities to a keyed
//! store and keeps a searchable projection of them in a search index. It
//! includes the store interface, an in-memory store, the pending write handle
//! and the reindexing hook.
pub mod errors;
pub mod interfaces;
pub mod memory;
mod pending_write;
mod repository;

#[cfg(test)]
mod test_support;

pub use errors::{RepositoryError, StoreError};
pub use interfaces::{EntityStore, ReindexOperation};
pub use memory::MemoryEntityStore;
pub use pending_write::PendingWrite;
pub use repository::Repository;
