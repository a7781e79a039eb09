//! Route Registration

use axum::{routing::get, Router};
use serde::{de::DeserializeOwned, Serialize};
use storage::Entity;
use tracing::info;

use crate::handlers::{
    create_entity, delete_entity, get_entity, list_entities, update_entity, EntityState,
};

pub mod products;
pub mod users;

/// Versioned prefix every resource is mounted under
pub const BASE_PATH: &str = "/v1/api";

/// The five CRUD routes for one entity type, bound to `store`
pub fn entity_routes<E>(store: EntityState<E>) -> Router
where
    E: Entity + Serialize,
    E::Create: DeserializeOwned,
{
    Router::new()
        .route("/", get(list_entities::<E>).post(create_entity::<E>))
        .route(
            "/:id",
            get(get_entity::<E>)
                .put(update_entity::<E>)
                .delete(delete_entity::<E>),
        )
        .with_state(store)
}

/// Log the mounted CRUD routes for a resource
pub fn log_routes(resource: &str) {
    let collection = format!("{}{}", BASE_PATH, resource);
    let item = format!("{}/:id", collection);
    for (method, route) in [
        ("GET", &collection),
        ("POST", &collection),
        ("GET", &item),
        ("PUT", &item),
        ("DELETE", &item),
    ] {
        info!(method, "Route: {}", route);
    }
}
