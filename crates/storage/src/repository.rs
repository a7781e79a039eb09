//! Persistence Traits

use async_trait::async_trait;

use crate::model::{Product, User};
use crate::StorageError;

/// A record type that the storage layer persists
pub trait Entity: Clone + Send + Sync + 'static {
    /// Request shape used to create or fully replace a record (no id)
    type Create: Send + Sync + 'static;

    /// Human-readable name, used in messages ("Product")
    const NAME: &'static str;

    fn id(&self) -> i64;

    /// Build the persisted form of `request` under `id`
    fn from_create(request: &Self::Create, id: i64) -> Self;
}

/// Per-entity CRUD operations
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Fetch one record; `NotFound` if no record has that id
    async fn get(&self, id: i64) -> Result<E, StorageError>;

    /// Fetch every record in id order; empty when there are none
    async fn get_all(&self) -> Result<Vec<E>, StorageError>;

    /// Insert a record and return its newly assigned id
    async fn create(&self, request: &E::Create) -> Result<i64, StorageError>;

    /// Replace the record with `entity.id()`; `NotFound` if absent
    async fn update(&self, entity: &E) -> Result<(), StorageError>;

    /// Remove a record; `NotFound` if absent
    async fn delete(&self, id: i64) -> Result<(), StorageError>;
}

/// Full storage backend used by the server.
///
/// `close` releases the backend and should be called once at shutdown.
#[async_trait]
pub trait Storage: EntityStore<Product> + EntityStore<User> {
    async fn close(&self) -> Result<(), StorageError>;
}
