//! Storage Layer
//!
//! Entity models and the persistence traits they are stored through, with a
//! SQLite adapter for the server and an in-memory adapter for tests.

mod memory;
mod model;
mod repository;
mod sql;

pub use memory::MemoryStorage;
pub use model::{CreateProductRequest, CreateUserRequest, Product, User};
pub use repository::{Entity, EntityStore, Storage};
pub use sql::SqlStorage;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// No record matched; carries the failed operation
    #[error("Not found: {operation}")]
    NotFound { operation: String },
    #[error("Storage lock poisoned: {0}")]
    Poisoned(String),
}

impl StorageError {
    /// Build a NotFound error tagged with the operation that failed
    pub fn not_found(operation: impl Into<String>) -> Self {
        StorageError::NotFound {
            operation: operation.into(),
        }
    }

    /// NotFound for `action` on record `id`, rendered as `get_product(7)`.
    ///
    /// Every adapter reports missing records in this form.
    pub fn record_not_found(action: &str, entity: &str, id: i64) -> Self {
        Self::not_found(format!("{}_{}({})", action, entity.to_lowercase(), id))
    }

    /// Whether this error means the targeted record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}
