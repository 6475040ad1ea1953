//! In-memory document store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::store::{Document, Repository, StoreResult};

/// A thread-safe map of id → record.
///
/// `find_all` returns records in insertion order so listings are stable.
#[derive(Clone)]
pub struct InMemoryRepository<T> {
    inner: Arc<DashMap<String, (u64, T)>>,
    sequence: Arc<AtomicU64>,
}

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn count(&self) -> usize {
        self.inner.len()
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Document> InMemoryRepository<T> {
    fn sorted(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        let mut records: Vec<(u64, T)> = self
            .inner
            .iter()
            .filter(|r| predicate(&r.value().1))
            .map(|r| r.value().clone())
            .collect();
        records.sort_by_key(|(seq, _)| *seq);
        records.into_iter().map(|(_, record)| record).collect()
    }
}

impl<T: Document> Repository<T> for InMemoryRepository<T> {
    fn save(&self, mut record: T) -> StoreResult<T> {
        let id = match record.id() {
            Some(id) => id.to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                record.set_id(id.clone());
                id
            }
        };

        // Replacing keeps the original position.
        let seq = match self.inner.get(&id) {
            Some(existing) => existing.0,
            None => self.sequence.fetch_add(1, Ordering::Relaxed),
        };
        self.inner.insert(id, (seq, record.clone()));
        Ok(record)
    }

    fn find_by_id(&self, id: &str) -> StoreResult<Option<T>> {
        Ok(self.inner.get(id).map(|r| r.value().1.clone()))
    }

    fn find_all(&self) -> StoreResult<Vec<T>> {
        Ok(self.sorted(|_| true))
    }

    fn find_by(&self, predicate: &(dyn Fn(&T) -> bool + Sync)) -> StoreResult<Vec<T>> {
        Ok(self.sorted(predicate))
    }

    fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        Ok(self.inner.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MovieInfo, Review};

    #[test]
    fn test_save_assigns_id_and_keeps_given_ones() {
        let repo = InMemoryRepository::new();
        let saved = repo.save(MovieInfo::new("Batman Begins", 2005)).unwrap();
        assert!(saved.movie_info_id.is_some());

        let mut explicit = MovieInfo::new("Dark Knight Rises", 2012);
        explicit.movie_info_id = Some("abc".to_string());
        let saved = repo.save(explicit).unwrap();
        assert_eq!(saved.movie_info_id.as_deref(), Some("abc"));
        assert_eq!(repo.find_by_id("abc").unwrap().unwrap().name, "Dark Knight Rises");
        assert_eq!(repo.count(), 2);
    }

    #[test]
    fn test_find_all_in_insertion_order() {
        let repo = InMemoryRepository::new();
        for name in ["Batman Begins", "The Dark Knight", "Dark Knight Rises"] {
            repo.save(MovieInfo::new(name, 2005)).unwrap();
        }
        let names: Vec<String> = repo.find_all().unwrap().into_iter().map(|m| m.name).collect();
        assert_eq!(names, ["Batman Begins", "The Dark Knight", "Dark Knight Rises"]);
    }

    #[test]
    fn test_find_by_field_and_delete() {
        let repo = InMemoryRepository::new();
        repo.save(Review::new("1", "Awesome Movie", 9.0)).unwrap();
        repo.save(Review::new("1", "Awesome Movie1", 9.0)).unwrap();
        let other = repo.save(Review::new("2", "Excellent Movie", 8.0)).unwrap();

        let for_one = repo.find_by(&|r: &Review| r.movie_info_id == "1").unwrap();
        assert_eq!(for_one.len(), 2);

        let id = other.review_id.unwrap();
        assert!(repo.delete_by_id(&id).unwrap());
        assert!(!repo.delete_by_id(&id).unwrap());
        assert!(repo.find_by_id(&id).unwrap().is_none());
    }
}
