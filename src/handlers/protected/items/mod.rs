// handlers/protected/items/mod.rs - /items endpoints
//
// Every item belongs to exactly one user and sits in a location that user can read.

pub mod query;
pub mod record;

use serde::Serialize;

use crate::auth::{authorize, Action, Decision};
use crate::database::models::{Item, Location};
use crate::database::StoreError;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

pub use query::{
    items_by_date, items_by_date_range, items_by_location, items_by_location_and_date,
    items_by_page, items_by_user,
};
pub use record::{item_create, item_delete, item_get, item_list, item_update};

#[derive(Debug, Serialize)]
pub struct ItemList {
    pub items: Vec<Item>,
}

/// Resolve a location an item may be placed in: it must exist and be readable by the
/// caller. Anything else is a 400 that does not reveal which case applied.
fn unknown_location() -> ApiError {
    ApiError::field_error("location_id", "Unknown location")
}

/// Item writes fail with `NotFound("Location")` when the location vanished after
/// `placeable_location` accepted it. Report that the same way as the pre-check.
pub(crate) fn item_write_error(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound("Location") => unknown_location(),
        other => other.into(),
    }
}

pub(crate) async fn placeable_location(
    state: &AppState,
    identity: &AuthUser,
    location_id: i64,
) -> Result<Location, ApiError> {
    let location = state
        .store
        .find_location(location_id)
        .await?
        .ok_or_else(unknown_location)?;

    match authorize(identity, &location, Action::Read) {
        Decision::Allowed => Ok(location),
        Decision::Forbidden => {
            tracing::warn!(user_id = identity.user_id, location_id, "item placed in foreign location");
            Err(unknown_location())
        }
    }
}
