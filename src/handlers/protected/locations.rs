// handlers/protected/locations.rs - /locations endpoints
//
// Locations owned by the caller plus public (unowned) ones are readable. Only owned
// locations can be changed or deleted.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::{authorize_or_conceal, Action};
use crate::database::models::{Location, NewLocation};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateLocationRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLocationRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LocationList {
    pub locations: Vec<Location>,
}

fn required_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::field_error("name", "Name cannot be empty"));
    }
    Ok(name.to_string())
}

/// POST /locations - Create a location owned by the caller
pub async fn location_create(
    State(state): State<AppState>,
    identity: AuthUser,
    payload: Result<Json<CreateLocationRequest>, JsonRejection>,
) -> ApiResult<Location> {
    let Json(request) = payload?;
    let location = state
        .store
        .create_location(NewLocation {
            name: required_name(&request.name)?,
            description: request.description,
            image_url: request.image_url,
            owner_id: Some(identity.user_id),
        })
        .await?;

    tracing::info!(user_id = identity.user_id, location_id = location.id, "location created");
    Ok(ApiResponse::created(location))
}

/// GET /locations - Own and public locations
pub async fn location_list(
    State(state): State<AppState>,
    identity: AuthUser,
) -> ApiResult<LocationList> {
    let locations = state.store.list_locations_visible_to(identity.user_id).await?;
    Ok(ApiResponse::success(LocationList { locations }))
}

/// GET /locations/:id
pub async fn location_get(
    State(state): State<AppState>,
    identity: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Location> {
    let Path(id) = path?;
    let location = authorize_or_conceal(&identity, state.store.find_location(id).await?, Action::Read)?;
    Ok(ApiResponse::success(location))
}

/// PUT /locations/:id - Partial update. The owner never changes.
pub async fn location_update(
    State(state): State<AppState>,
    identity: AuthUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateLocationRequest>, JsonRejection>,
) -> ApiResult<Location> {
    let Path(id) = path?;
    let mut location =
        authorize_or_conceal(&identity, state.store.find_location(id).await?, Action::Update)?;
    let Json(request) = payload?;

    if let Some(name) = request.name {
        location.name = required_name(&name)?;
    }
    if let Some(description) = request.description {
        location.description = description;
    }
    if let Some(image_url) = request.image_url {
        location.image_url = image_url;
    }

    let saved = state.store.save_location(&location).await?;
    Ok(ApiResponse::success(saved))
}

/// DELETE /locations/:id - 409 while any item still sits in the location
pub async fn location_delete(
    State(state): State<AppState>,
    identity: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Value> {
    let Path(id) = path?;
    let location =
        authorize_or_conceal(&identity, state.store.find_location(id).await?, Action::Delete)?;

    let linked = state.store.count_items_in_location(location.id).await?;
    if linked > 0 {
        tracing::warn!(location_id = location.id, linked, "refusing to delete location in use");
        return Err(ApiError::conflict(format!(
            "Cannot delete location with linked items ({} item(s) still reference it)",
            linked
        )));
    }

    state.store.delete_location(location.id).await?;
    tracing::info!(user_id = identity.user_id, location_id = location.id, "location deleted");
    Ok(ApiResponse::success(json!({ "id": location.id, "deleted": true })))
}
