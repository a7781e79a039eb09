//! Entity Records

use serde::{Deserialize, Serialize};

use crate::repository::Entity;

/// Product record as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// `None` when the product was created with an empty description
    pub description: Option<String>,
    pub price: f64,
    pub stock_quantity: i32,
}

/// Body of a product create or full-replace request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    /// Empty string means "no description"
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub stock_quantity: i32,
}

impl CreateProductRequest {
    /// Description as stored: empty input becomes `None`
    pub fn description(&self) -> Option<&str> {
        if self.description.is_empty() {
            None
        } else {
            Some(self.description.as_str())
        }
    }

    /// Convert into a product carrying the given id
    pub fn to_product(&self, id: i64) -> Product {
        Product {
            id,
            name: self.name.clone(),
            description: self.description().map(str::to_string),
            price: self.price,
            stock_quantity: self.stock_quantity,
        }
    }
}

impl Entity for Product {
    type Create = CreateProductRequest;

    const NAME: &'static str = "Product";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_create(request: &CreateProductRequest, id: i64) -> Self {
        request.to_product(id)
    }
}

/// User record.
///
/// The password is kept as plain text; it is never written to responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Body of a user create or full-replace request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
}

impl CreateUserRequest {
    /// Convert into a user carrying the given id
    pub fn to_user(&self, id: i64) -> User {
        User {
            id,
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

impl Entity for User {
    type Create = CreateUserRequest;

    const NAME: &'static str = "User";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_create(request: &CreateUserRequest, id: i64) -> Self {
        request.to_user(id)
    }
}
