//! Persistence collaborator.
//!
//! The storage engine is outside the core; handlers only see the narrow
//! [`Repository`] contract. [`InMemoryRepository`] is the reference
//! implementation used by the services and tests.

pub mod memory;

use thiserror::Error;

pub use memory::InMemoryRepository;

/// A record with an optional, store-assigned id.
pub trait Document: Clone + Send + Sync + 'static {
    fn id(&self) -> Option<&str>;
    fn set_id(&mut self, id: String);
}

/// Errors surfaced by a store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// save / findById / findAll / findByField / deleteById.
pub trait Repository<T: Document>: Send + Sync {
    /// Insert or replace; assigns an id when the record has none.
    fn save(&self, record: T) -> StoreResult<T>;

    fn find_by_id(&self, id: &str) -> StoreResult<Option<T>>;

    fn find_all(&self) -> StoreResult<Vec<T>>;

    /// Every record matching `predicate` (findByField).
    fn find_by(&self, predicate: &(dyn Fn(&T) -> bool + Sync)) -> StoreResult<Vec<T>>;

    /// Returns whether a record was removed.
    fn delete_by_id(&self, id: &str) -> StoreResult<bool>;
}
