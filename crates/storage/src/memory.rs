//! In-Memory Storage
//!
//! Process-local storage used by tests. Each collection sits behind its own
//! mutex and hands out ids from a counter that only moves forward, so an id
//! is never reused after a delete.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::model::{Product, User};
use crate::repository::{Entity, EntityStore, Storage};
use crate::StorageError;

/// Ordered rows plus the next id to hand out
#[derive(Debug)]
struct Table<E> {
    rows: Vec<E>,
    next_id: i64,
}

impl<E: Entity> Table<E> {
    fn new() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 1,
        }
    }

    fn not_found(action: &str, id: i64) -> StorageError {
        StorageError::record_not_found(action, E::NAME, id)
    }

    fn get(&self, id: i64) -> Option<&E> {
        self.rows.iter().find(|row| row.id() == id)
    }

    fn insert(&mut self, request: &E::Create) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.push(E::from_create(request, id));
        id
    }

    /// Insert a row under its own id, keeping the counter ahead of it
    fn seed(&mut self, row: E) {
        self.next_id = self.next_id.max(row.id() + 1);
        self.rows.push(row);
    }

    fn replace(&mut self, entity: &E) -> bool {
        match self.rows.iter_mut().find(|row| row.id() == entity.id()) {
            Some(row) => {
                *row = entity.clone();
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: i64) -> bool {
        match self.rows.iter().position(|row| row.id() == id) {
            Some(index) => {
                self.rows.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Storage backed by in-process collections
pub struct MemoryStorage {
    products: Mutex<Table<Product>>,
    users: Mutex<Table<User>>,
}

impl MemoryStorage {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        info!("Creating in-memory storage");
        Self {
            products: Mutex::new(Table::new()),
            users: Mutex::new(Table::new()),
        }
    }

    /// Insert fixture products with their own ids
    pub fn seed_products(&self, products: Vec<Product>) -> Result<(), StorageError> {
        let mut table = lock(&self.products)?;
        for product in products {
            table.seed(product);
        }
        Ok(())
    }

    /// Number of stored products
    pub fn product_count(&self) -> usize {
        self.products.lock().map(|t| t.rows.len()).unwrap_or(0)
    }

    /// Number of stored users
    pub fn user_count(&self) -> usize {
        self.users.lock().map(|t| t.rows.len()).unwrap_or(0)
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<E>(table: &Mutex<Table<E>>) -> Result<MutexGuard<'_, Table<E>>, StorageError> {
    table
        .lock()
        .map_err(|e| StorageError::Poisoned(format!("Lock error: {}", e)))
}

/// Implements `EntityStore` for one collection of `MemoryStorage`
macro_rules! memory_entity_store {
    ($entity:ty, $field:ident) => {
        #[async_trait]
        impl EntityStore<$entity> for MemoryStorage {
            async fn get(&self, id: i64) -> Result<$entity, StorageError> {
                let table = lock(&self.$field)?;
                table.get(id).cloned().ok_or_else(|| Table::<$entity>::not_found("get", id))
            }

            async fn get_all(&self) -> Result<Vec<$entity>, StorageError> {
                let table = lock(&self.$field)?;
                Ok(table.rows.clone())
            }

            async fn create(
                &self,
                request: &<$entity as Entity>::Create,
            ) -> Result<i64, StorageError> {
                let mut table = lock(&self.$field)?;
                let id = table.insert(request);
                debug!("Inserted {} with ID {}", <$entity>::NAME, id);
                Ok(id)
            }

            async fn update(&self, entity: &$entity) -> Result<(), StorageError> {
                let mut table = lock(&self.$field)?;
                if table.replace(entity) {
                    Ok(())
                } else {
                    Err(Table::<$entity>::not_found("update", entity.id()))
                }
            }

            async fn delete(&self, id: i64) -> Result<(), StorageError> {
                let mut table = lock(&self.$field)?;
                if table.remove(id) {
                    Ok(())
                } else {
                    Err(Table::<$entity>::not_found("delete", id))
                }
            }
        }
    };
}

memory_entity_store!(Product, products);
memory_entity_store!(User, users);

#[async_trait]
impl Storage for MemoryStorage {
    async fn close(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
