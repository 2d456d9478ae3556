// handlers/public/users.rs - POST /users handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::database::models::User;
use crate::handlers::public::auth::register::RegisterRequest;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /users - Create an account without signing in
///
/// Same body and validation as registration. Returns 201 with the user only.
pub async fn user_create(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(request) = payload?;
    let user = state.accounts.create_account(request.into()).await?;
    Ok(ApiResponse::created(user))
}
