//! SQLite Storage
//!
//! One parameterized statement per call; no transactions. "No row returned"
//! on reads and "no row affected" on writes both become `NotFound`.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::model::{CreateProductRequest, CreateUserRequest, Product, User};
use crate::repository::{Entity, EntityStore, Storage};
use crate::StorageError;

const CREATE_PRODUCTS: &str = "
    CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT NULL,
        price REAL NOT NULL,
        stock_quantity INTEGER NOT NULL
    )";

const CREATE_USERS: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL,
        password TEXT NOT NULL
    )";

/// Storage backed by a SQLite connection pool
pub struct SqlStorage {
    pool: SqlitePool,
}

impl SqlStorage {
    /// Open a pool against `url` (e.g. `sqlite://shop.db?mode=rwc`)
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StorageError> {
        info!("Connecting to database {}", url);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the tables if they are missing
    pub async fn init_schema(&self) -> Result<(), StorageError> {
        sqlx::query(CREATE_PRODUCTS).execute(&self.pool).await?;
        sqlx::query(CREATE_USERS).execute(&self.pool).await?;
        debug!("Schema ready");
        Ok(())
    }
}

#[async_trait]
impl EntityStore<Product> for SqlStorage {
    async fn get(&self, id: i64) -> Result<Product, StorageError> {
        sqlx::query_as::<_, Product>(
            "SELECT id, name, description, price, stock_quantity FROM products WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StorageError::record_not_found("get", Product::NAME, id))
    }

    async fn get_all(&self) -> Result<Vec<Product>, StorageError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, price, stock_quantity FROM products ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn create(&self, request: &CreateProductRequest) -> Result<i64, StorageError> {
        let result = sqlx::query(
            "INSERT INTO products (name, description, price, stock_quantity) VALUES (?, ?, ?, ?)",
        )
        .bind(&request.name)
        .bind(request.description())
        .bind(request.price)
        .bind(request.stock_quantity)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn update(&self, product: &Product) -> Result<(), StorageError> {
        let result = sqlx::query(
            "UPDATE products SET name = ?, description = ?, price = ?, stock_quantity = ? WHERE id = ?",
        )
        .bind(&product.name)
        .bind(product.description.as_deref())
        .bind(product.price)
        .bind(product.stock_quantity)
        .bind(product.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::record_not_found("update", Product::NAME, product.id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::record_not_found("delete", Product::NAME, id));
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore<User> for SqlStorage {
    async fn get(&self, id: i64) -> Result<User, StorageError> {
        sqlx::query_as::<_, User>("SELECT id, email, password FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StorageError::record_not_found("get", User::NAME, id))
    }

    async fn get_all(&self) -> Result<Vec<User>, StorageError> {
        let users = sqlx::query_as::<_, User>("SELECT id, email, password FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn create(&self, request: &CreateUserRequest) -> Result<i64, StorageError> {
        let result = sqlx::query("INSERT INTO users (email, password) VALUES (?, ?)")
            .bind(&request.email)
            .bind(&request.password)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    async fn update(&self, user: &User) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE users SET email = ?, password = ? WHERE id = ?")
            .bind(&user.email)
            .bind(&user.password)
            .bind(user.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::record_not_found("update", User::NAME, user.id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::record_not_found("delete", User::NAME, id));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for SqlStorage {
    async fn close(&self) -> Result<(), StorageError> {
        info!("Closing database pool");
        self.pool.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Single connection so every query sees the same in-memory database
    async fn memory_db() -> SqlStorage {
        let storage = SqlStorage::connect("sqlite::memory:", 1).await.unwrap();
        storage.init_schema().await.unwrap();
        storage
    }

    fn product_request(description: &str) -> CreateProductRequest {
        CreateProductRequest {
            name: "Test Product".to_string(),
            description: description.to_string(),
            price: 1.99,
            stock_quantity: 10,
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let storage = memory_db().await;
        let request = product_request("Test Description");

        let id = EntityStore::<Product>::create(&storage, &request).await.unwrap();
        let product = EntityStore::<Product>::get(&storage, id).await.unwrap();

        assert_eq!(product, request.to_product(id));
    }

    #[tokio::test]
    async fn test_empty_description_stored_as_null() {
        let storage = memory_db().await;
        let id = EntityStore::<Product>::create(&storage, &product_request(""))
            .await
            .unwrap();

        let product = EntityStore::<Product>::get(&storage, id).await.unwrap();
        assert_eq!(product.description, None);
    }

    #[tokio::test]
    async fn test_get_all_empty_then_ordered() {
        let storage = memory_db().await;
        assert!(EntityStore::<Product>::get_all(&storage).await.unwrap().is_empty());

        for _ in 0..3 {
            EntityStore::<Product>::create(&storage, &product_request(""))
                .await
                .unwrap();
        }
        let ids: Vec<i64> = EntityStore::<Product>::get_all(&storage)
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_missing_id_is_not_found() {
        let storage = memory_db().await;

        let get = EntityStore::<Product>::get(&storage, 999_999).await;
        assert!(get.unwrap_err().is_not_found());

        let ghost = product_request("").to_product(5);
        let update = EntityStore::<Product>::update(&storage, &ghost).await;
        assert!(update.unwrap_err().is_not_found());

        let delete = EntityStore::<Product>::delete(&storage, 5).await;
        assert!(delete.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let storage = memory_db().await;
        let id = EntityStore::<Product>::create(&storage, &product_request("first"))
            .await
            .unwrap();

        let mut replacement = product_request("second").to_product(id);
        replacement.price = 5.0;
        EntityStore::<Product>::update(&storage, &replacement).await.unwrap();
        assert_eq!(
            EntityStore::<Product>::get(&storage, id).await.unwrap(),
            replacement
        );

        EntityStore::<Product>::delete(&storage, id).await.unwrap();
        assert!(EntityStore::<Product>::delete(&storage, id)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_user_update_touches_users_table() {
        let storage = memory_db().await;
        let request = CreateUserRequest {
            email: "a@example.com".to_string(),
            password: "secret".to_string(),
        };
        let id = EntityStore::<User>::create(&storage, &request).await.unwrap();

        let mut user = request.to_user(id);
        user.email = "b@example.com".to_string();
        EntityStore::<User>::update(&storage, &user).await.unwrap();

        let stored = EntityStore::<User>::get(&storage, id).await.unwrap();
        assert_eq!(stored.email, "b@example.com");
        assert_eq!(stored.password, "secret");
    }

    fn user_request(email: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let storage = memory_db().await;

        let get = EntityStore::<User>::get(&storage, 42).await.unwrap_err();
        assert!(get.is_not_found());
        assert_eq!(get.to_string(), "Not found: get_user(42)");

        let ghost = user_request("ghost@example.com").to_user(42);
        let update = EntityStore::<User>::update(&storage, &ghost).await.unwrap_err();
        assert_eq!(update.to_string(), "Not found: update_user(42)");

        let delete = EntityStore::<User>::delete(&storage, 42).await.unwrap_err();
        assert_eq!(delete.to_string(), "Not found: delete_user(42)");
    }

    #[tokio::test]
    async fn test_users_get_all_ordered() {
        let storage = memory_db().await;
        assert!(EntityStore::<User>::get_all(&storage).await.unwrap().is_empty());

        for email in ["a@example.com", "b@example.com", "c@example.com"] {
            EntityStore::<User>::create(&storage, &user_request(email))
                .await
                .unwrap();
        }
        EntityStore::<User>::delete(&storage, 2).await.unwrap();

        let users = EntityStore::<User>::get_all(&storage).await.unwrap();
        let emails: Vec<&str> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, vec!["a@example.com", "c@example.com"]);
        assert_eq!(users[1].id, 3);
    }
}
