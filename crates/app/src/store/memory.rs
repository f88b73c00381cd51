//! `InMemoryStore` - process-local document store for tests and demos.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use super::{Document, DocumentStore, Fields, StoreError};

/// Length of generated identifiers, matching Firestore auto-IDs.
const ID_LENGTH: usize = 20;

type Collection = BTreeMap<String, Fields>;

/// In-memory document store backed by a map per collection.
///
/// Clone-friendly via `Arc`; clones share state, so a test can keep a handle
/// while a screen owns another.
///
/// # Fault injection
///
/// - [`fail_reads`](Self::fail_reads) makes every `list` fail.
/// - [`fail_writes_after`](Self::fail_writes_after) lets `n` more writes
///   succeed and fails every write after that.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    collections: RwLock<HashMap<String, Collection>>,
    writes: AtomicUsize,
    write_budget: RwLock<Option<usize>>,
    fail_reads: AtomicBool,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes (create, update, delete) so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent `list` fail, or stop doing so.
    pub fn fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Allow `n` more writes, then fail every write after them.
    pub fn fail_writes_after(&self, n: usize) {
        if let Ok(mut budget) = self.inner.write_budget.write() {
            *budget = Some(n);
        }
    }

    /// Remove any write failure set by [`fail_writes_after`](Self::fail_writes_after).
    pub fn heal(&self) {
        if let Ok(mut budget) = self.inner.write_budget.write() {
            *budget = None;
        }
        self.fail_reads(false);
    }

    /// Fetch one document directly, bypassing fault injection.
    #[must_use]
    pub fn get(&self, collection: &str, id: &str) -> Option<Fields> {
        let collections = self.inner.collections.read().ok()?;
        collections.get(collection)?.get(id).cloned()
    }

    /// Number of documents in a collection, bypassing fault injection.
    #[must_use]
    pub fn count(&self, collection: &str) -> usize {
        self.inner
            .collections
            .read()
            .map(|c| c.get(collection).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    fn generate_id() -> String {
        Uuid::new_v4().simple().to_string().chars().take(ID_LENGTH).collect()
    }

    /// Consume one unit of write budget, failing when it is exhausted.
    fn admit_write(&self, op: &str) -> Result<(), StoreError> {
        let mut budget = self
            .inner
            .write_budget
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;
        match budget.as_mut() {
            Some(0) => Err(StoreError::Unavailable(format!("injected {op} failure"))),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn record_write(&self) {
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
    }
}

impl DocumentStore for InMemoryStore {
    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        self.admit_write("create")?;
        let id = Self::generate_id();
        {
            let mut collections = self
                .inner
                .collections
                .write()
                .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.clone(), fields);
        }
        self.record_write();
        Ok(id)
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected list failure".into()));
        }
        let collections = self
            .inner
            .collections
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.admit_write("update")?;
        {
            let mut collections = self
                .inner
                .collections
                .write()
                .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;
            let existing = collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| StoreError::NotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                })?;
            existing.extend(fields);
        }
        self.record_write();
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.admit_write("delete")?;
        {
            let mut collections = self
                .inner
                .collections
                .write()
                .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;
            if let Some(docs) = collections.get_mut(collection) {
                docs.remove(id);
            }
        }
        self.record_write();
        Ok(())
    }
}
