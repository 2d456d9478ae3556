// handlers/protected/items/record.rs - single-item CRUD

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{item_write_error, placeable_location, ItemList};
use crate::auth::{authorize_or_conceal, Action};
use crate::database::models::{Item, NewItem};
use crate::database::ItemFilter;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// Body of POST /items. Owner fields in the body are ignored.
#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub location_id: i64,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location_id: Option<i64>,
    pub image_url: Option<String>,
}

fn required_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::field_error("name", "Name cannot be empty"));
    }
    Ok(name.to_string())
}

/// POST /items - Create an item owned by the caller
pub async fn item_create(
    State(state): State<AppState>,
    identity: AuthUser,
    payload: Result<Json<CreateItemRequest>, JsonRejection>,
) -> ApiResult<Item> {
    let Json(request) = payload?;
    let name = required_name(&request.name)?;
    let location = placeable_location(&state, &identity, request.location_id).await?;

    let item = state
        .store
        .create_item(NewItem {
            name,
            description: request.description,
            owner_id: identity.user_id,
            location_id: location.id,
            image_url: request.image_url,
        })
        .await
        .map_err(item_write_error)?;

    tracing::info!(user_id = identity.user_id, item_id = item.id, "item created");
    Ok(ApiResponse::created(item))
}

/// GET /items - All of the caller's items
pub async fn item_list(State(state): State<AppState>, identity: AuthUser) -> ApiResult<ItemList> {
    let items = state
        .store
        .list_items(&ItemFilter::owned_by(identity.user_id), None)
        .await?;
    Ok(ApiResponse::success(ItemList { items }))
}

/// GET /items/:id
pub async fn item_get(
    State(state): State<AppState>,
    identity: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Item> {
    let Path(id) = path?;
    let item = authorize_or_conceal(&identity, state.store.find_item(id).await?, Action::Read)?;
    Ok(ApiResponse::success(item))
}

/// PUT /items/:id - Partial update. The owner never changes.
pub async fn item_update(
    State(state): State<AppState>,
    identity: AuthUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateItemRequest>, JsonRejection>,
) -> ApiResult<Item> {
    let Path(id) = path?;
    let mut item = authorize_or_conceal(&identity, state.store.find_item(id).await?, Action::Update)?;
    let Json(request) = payload?;

    if let Some(name) = request.name {
        item.name = required_name(&name)?;
    }
    if let Some(description) = request.description {
        item.description = description;
    }
    if let Some(image_url) = request.image_url {
        item.image_url = image_url;
    }
    if let Some(location_id) = request.location_id {
        item.location_id = placeable_location(&state, &identity, location_id).await?.id;
    }

    let saved = state.store.save_item(&item).await.map_err(item_write_error)?;
    Ok(ApiResponse::success(saved))
}

/// DELETE /items/:id
pub async fn item_delete(
    State(state): State<AppState>,
    identity: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Value> {
    let Path(id) = path?;
    let item = authorize_or_conceal(&identity, state.store.find_item(id).await?, Action::Delete)?;

    state.store.delete_item(item.id).await?;
    tracing::info!(user_id = identity.user_id, item_id = item.id, "item deleted");
    Ok(ApiResponse::success(json!({ "id": item.id, "deleted": true })))
}
