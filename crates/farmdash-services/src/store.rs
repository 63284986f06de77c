//! Resource storage trait and the in-memory backend.
//!
//! `ResourceStore` abstracts over storage implementations so crops and todos
//! share one list/create/update/delete contract regardless of backing.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use farmdash_core::AppError;
use parking_lot::RwLock;
use thiserror::Error;

/// Errors that can occur during store operations.
///
/// The in-memory backend never fails; persistent backends report through `Storage`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage error (database, network, etc.).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Generic error wrapper.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Storage(msg) => AppError::Storage(msg),
            StoreError::Other(e) => AppError::Other(e),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// An entity kept in a [`ResourceStore`].
pub trait Resource: Clone + Send + Sync + 'static {
    /// Fields accepted on creation; missing ones take defaults.
    type Draft: Send;

    /// Partial update; only present fields are applied.
    type Patch: Send;

    /// Build a new entity with a server-assigned id.
    fn from_draft(id: String, draft: Self::Draft) -> Self;

    fn id(&self) -> &str;

    /// Merge present patch fields. Never touches the id.
    fn apply_patch(&mut self, patch: Self::Patch);
}

/// Storage backend for one kind of resource.
pub trait ResourceStore<T: Resource>: Send + Sync {
    /// All entities in insertion order.
    fn list(&self) -> StoreResult<Vec<T>>;

    /// Get an entity by id.
    ///
    /// Returns `None` if it doesn't exist.
    fn get(&self, id: &str) -> StoreResult<Option<T>>;

    /// Assign a fresh id, append, and return the created entity.
    fn create(&self, draft: T::Draft) -> StoreResult<T>;

    /// Merge `patch` into the entity with `id`.
    ///
    /// Returns `None` if no entity has that id.
    fn update(&self, id: &str, patch: T::Patch) -> StoreResult<Option<T>>;

    /// Remove the entity with `id`. Unknown ids are a no-op.
    fn delete(&self, id: &str) -> StoreResult<()>;
}

/// Source of fresh identifiers.
pub trait IdGenerator: Send + Sync + fmt::Debug {
    fn next_id(&self) -> String;
}

/// Random UUID v4 identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Predictable `prefix-1`, `prefix-2`, ... identifiers.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}

/// Process-lifetime storage backed by a vector.
///
/// Writers take the lock for the whole read-modify-write, so no partial
/// update is ever visible; concurrent writers are last-write-wins.
pub struct InMemoryStore<T> {
    items: RwLock<Vec<T>>,
    ids: Box<dyn IdGenerator>,
}

impl<T> InMemoryStore<T> {
    /// Create an empty store with UUID identifiers.
    pub fn new() -> Self {
        Self::with_id_generator(UuidGenerator)
    }

    pub fn with_id_generator(ids: impl IdGenerator + 'static) -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            ids: Box::new(ids),
        }
    }

    /// Get the item count.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for InMemoryStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("len", &self.len())
            .field("ids", &self.ids)
            .finish()
    }
}

impl<T: Resource> ResourceStore<T> for InMemoryStore<T> {
    fn list(&self) -> StoreResult<Vec<T>> {
        Ok(self.items.read().clone())
    }

    fn get(&self, id: &str) -> StoreResult<Option<T>> {
        Ok(self.items.read().iter().find(|item| item.id() == id).cloned())
    }

    fn create(&self, draft: T::Draft) -> StoreResult<T> {
        let item = T::from_draft(self.ids.next_id(), draft);
        self.items.write().push(item.clone());
        tracing::debug!(id = item.id(), "Created resource");
        Ok(item)
    }

    fn update(&self, id: &str, patch: T::Patch) -> StoreResult<Option<T>> {
        let mut items = self.items.write();
        let Some(item) = items.iter_mut().find(|item| item.id() == id) else {
            tracing::debug!(id, "Update of unknown resource");
            return Ok(None);
        };
        item.apply_patch(patch);
        Ok(Some(item.clone()))
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        let mut items = self.items.write();
        let before = items.len();
        items.retain(|item| item.id() != id);
        if items.len() == before {
            tracing::debug!(id, "Delete of unknown resource ignored");
        }
        Ok(())
    }
}
