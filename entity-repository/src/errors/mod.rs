//! Error types for the entity repository.
//! Consolidates and re-exports the store and repository errors.
mod repository;
mod store;

pub use repository::RepositoryError;
pub use store::StoreError;
