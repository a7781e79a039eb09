//! Product Routes
//!
//! | Method | Path            | Success                 | Failures      |
//! |--------|-----------------|-------------------------|---------------|
//! | GET    | `/products`     | 200 `[Product]`         | 500           |
//! | GET    | `/products/:id` | 200 `Product`           | 400, 404, 500 |
//! | POST   | `/products`     | 201 `{"id": i64}`       | 400, 500      |
//! | PUT    | `/products/:id` | 204                     | 400, 404, 500 |
//! | DELETE | `/products/:id` | 204                     | 400, 404, 500 |
//!
//! POST and PUT take a `CreateProductRequest` body
//! `{name, description, price, stock_quantity}`.

use axum::Router;
use storage::Product;

use super::entity_routes;
use crate::handlers::EntityState;

/// Mount point below the base path
pub const PATH: &str = "/products";

pub fn routes(store: EntityState<Product>) -> Router {
    entity_routes::<Product>(store)
}
