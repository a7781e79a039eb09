//! User Routes
//!
//! Same five CRUD routes as products, mounted at `/users`, with a
//! `{email, password}` request body. Responses carry `{id, email}` only.

use axum::Router;
use storage::User;

use super::entity_routes;
use crate::handlers::EntityState;

/// Mount point below the base path
pub const PATH: &str = "/users";

pub fn routes(store: EntityState<User>) -> Router {
    entity_routes::<User>(store)
}
