// handlers/protected/items/query.rs - filtered views over the caller's items

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use super::ItemList;
use crate::api::{day_or_timestamp, day_range, single_day, DayBounds, PageMeta, PageParams, PageQuery};
use crate::auth::{authorize_or_conceal, Action};
use crate::database::models::Item;
use crate::database::ItemFilter;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ItemPage {
    pub items: Vec<Item>,
    #[serde(flatten)]
    pub page: PageMeta,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

async fn list(state: &AppState, filter: ItemFilter) -> ApiResult<ItemList> {
    let items = state.store.list_items(&filter, None).await?;
    Ok(ApiResponse::success(ItemList { items }))
}

fn within(filter: ItemFilter, bounds: DayBounds) -> ItemFilter {
    filter.created_within(bounds.from, bounds.before)
}

/// GET /items/page?page=&page_size=
pub async fn items_by_page(
    State(state): State<AppState>,
    identity: AuthUser,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<ItemPage> {
    let Query(query) = query?;
    let params = PageParams::try_from(query)?;
    let filter = ItemFilter::owned_by(identity.user_id);

    let total = state.store.count_items(&filter).await?;
    let items = state.store.list_items(&filter, Some(params.window())).await?;

    Ok(ApiResponse::success(ItemPage {
        items,
        page: params.meta(total),
    }))
}

/// GET /items/location/:location_id - Caller's items in a readable location
pub async fn items_by_location(
    State(state): State<AppState>,
    identity: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<ItemList> {
    let Path(location_id) = path?;
    let location = authorize_or_conceal(
        &identity,
        state.store.find_location(location_id).await?,
        Action::Read,
    )?;

    list(&state, ItemFilter::owned_by(identity.user_id).in_location(location.id)).await
}

/// GET /items/user/:user_id - Only the caller's own id is answered
pub async fn items_by_user(
    State(state): State<AppState>,
    identity: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<ItemList> {
    let Path(user_id) = path?;
    if user_id != identity.user_id {
        tracing::warn!(user_id = identity.user_id, requested = user_id, "item listing for another user");
        return Err(ApiError::not_found("User not found"));
    }

    list(&state, ItemFilter::owned_by(identity.user_id)).await
}

/// GET /items/date?date=YYYY-MM-DD - Items created on that UTC day
pub async fn items_by_date(
    State(state): State<AppState>,
    identity: AuthUser,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> ApiResult<ItemList> {
    let Query(query) = query?;
    let bounds = single_day(query.date.as_deref())?;
    list(&state, within(ItemFilter::owned_by(identity.user_id), bounds)).await
}

/// GET /items/date-range?start_date=&end_date= - Inclusive range of UTC days
pub async fn items_by_date_range(
    State(state): State<AppState>,
    identity: AuthUser,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> ApiResult<ItemList> {
    let Query(query) = query?;
    let bounds = day_range(query.start_date.as_deref(), query.end_date.as_deref())?;
    list(&state, within(ItemFilter::owned_by(identity.user_id), bounds)).await
}

/// GET /items/location/:location_id/date?date= - Date as YYYY-MM-DD or Unix seconds
pub async fn items_by_location_and_date(
    State(state): State<AppState>,
    identity: AuthUser,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> ApiResult<ItemList> {
    let Path(location_id) = path?;
    let Query(query) = query?;
    let bounds = day_or_timestamp(query.date.as_deref())?;

    let location = authorize_or_conceal(
        &identity,
        state.store.find_location(location_id).await?,
        Action::Read,
    )?;

    let filter = ItemFilter::owned_by(identity.user_id).in_location(location.id);
    list(&state, within(filter, bounds)).await
}
