//! Generic Entity Handlers
//!
//! One handler per verb, generic over the entity type. The entity store is
//! the router state, so the same handlers serve products and users.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use metrics::counter;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use storage::{Entity, EntityStore, StorageError};
use tracing::debug;

use crate::response::{parse_json_body, respond_empty, respond_id, respond_json, ApiError};

/// Router state for one entity collection
pub type EntityState<E> = Arc<dyn EntityStore<E>>;

/// Parse the `{id}` path segment
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|e| ApiError::bad_request("Invalid parameter 'id'", "parse_id_error", e))
}

/// Map a storage failure to 404 for NotFound and 500 for everything else
fn storage_failure<E: Entity>(err: StorageError, action: &str, context: &'static str) -> ApiError {
    if err.is_not_found() {
        ApiError::not_found(format!("{} not found", E::NAME), context, err)
    } else {
        ApiError::internal(
            format!("Failed to {} {}", action, E::NAME.to_lowercase()),
            context,
            err,
        )
    }
}

/// `GET /` - every record as a JSON array
pub async fn list_entities<E>(State(store): State<EntityState<E>>) -> Result<Response, ApiError>
where
    E: Entity + Serialize,
{
    let entities = store.get_all().await.map_err(|e| {
        ApiError::internal(
            format!("Failed to get {}s", E::NAME.to_lowercase()),
            "get_entities_error",
            e,
        )
    })?;

    Ok(respond_json(StatusCode::OK, &entities))
}

/// `GET /:id`
pub async fn get_entity<E>(
    State(store): State<EntityState<E>>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError>
where
    E: Entity + Serialize,
{
    let id = parse_id(&raw_id)?;
    let entity = store
        .get(id)
        .await
        .map_err(|e| storage_failure::<E>(e, "get", "get_entity_error"))?;

    Ok(respond_json(StatusCode::OK, &entity))
}

/// `POST /` - responds 201 with `{"id": ...}`
pub async fn create_entity<E>(
    State(store): State<EntityState<E>>,
    body: Bytes,
) -> Result<Response, ApiError>
where
    E: Entity,
    E::Create: DeserializeOwned,
{
    let request: E::Create = parse_json_body(&body)?;
    let id = store
        .create(&request)
        .await
        .map_err(|e| storage_failure::<E>(e, "create", "create_entity_error"))?;

    counter!("entities_created_total", "entity" => E::NAME).increment(1);
    debug!("Created {} {}", E::NAME, id);
    Ok(respond_id(StatusCode::CREATED, id))
}

/// `PUT /:id` - full replace, 204 on success
pub async fn update_entity<E>(
    State(store): State<EntityState<E>>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError>
where
    E: Entity,
    E::Create: DeserializeOwned,
{
    let id = parse_id(&raw_id)?;
    let request: E::Create = parse_json_body(&body)?;
    let entity = E::from_create(&request, id);

    store
        .update(&entity)
        .await
        .map_err(|e| storage_failure::<E>(e, "update", "update_entity_error"))?;

    Ok(respond_empty(StatusCode::NO_CONTENT))
}

/// `DELETE /:id` - 204 on success
pub async fn delete_entity<E>(
    State(store): State<EntityState<E>>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError>
where
    E: Entity,
{
    let id = parse_id(&raw_id)?;
    store
        .delete(id)
        .await
        .map_err(|e| storage_failure::<E>(e, "delete", "delete_entity_error"))?;

    Ok(respond_empty(StatusCode::NO_CONTENT))
}
