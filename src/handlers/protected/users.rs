// handlers/protected/users.rs - /users directory and self-service account endpoints

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::{PageMeta, PageParams, PageQuery};
use crate::auth::{authorize_or_conceal, Action};
use crate::database::models::{User, UserSummary};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::ProfileChanges;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UserDirectory {
    pub users: Vec<UserSummary>,
    #[serde(flatten)]
    pub page: PageMeta,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// GET /users - Paginated directory of active accounts (id and name only)
pub async fn user_list(
    State(state): State<AppState>,
    _identity: AuthUser,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<UserDirectory> {
    let Query(query) = query?;
    let params = PageParams::try_from(query)?;

    let total = state.store.count_users().await?;
    let users = state.store.list_users(params.window()).await?;

    Ok(ApiResponse::success(UserDirectory {
        users: users.iter().map(User::summary).collect(),
        page: params.meta(total),
    }))
}

/// GET /users/:id - Own account only
pub async fn user_get(
    State(state): State<AppState>,
    identity: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<User> {
    let Path(id) = path?;
    let user = authorize_or_conceal(&identity, state.store.find_user_by_id(id).await?, Action::Read)?;
    Ok(ApiResponse::success(user))
}

/// PUT /users/:id - Change name, email or password of the own account
pub async fn user_update(
    State(state): State<AppState>,
    identity: AuthUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Path(id) = path?;
    let user = authorize_or_conceal(&identity, state.store.find_user_by_id(id).await?, Action::Update)?;
    let Json(request) = payload?;

    let changes = ProfileChanges {
        name: request.name,
        email: request.email,
        password: request.password,
    };
    let updated = state.accounts.update_profile(user.id, changes).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /users/:id - Soft delete the own account
pub async fn user_delete(
    State(state): State<AppState>,
    identity: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Value> {
    let Path(id) = path?;
    let user = authorize_or_conceal(&identity, state.store.find_user_by_id(id).await?, Action::Delete)?;
    state.accounts.delete_account(user.id).await?;
    Ok(ApiResponse::success(json!({ "id": user.id, "deleted": true })))
}
