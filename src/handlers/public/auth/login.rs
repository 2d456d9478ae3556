// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::Session;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - Exchange email and password for a token pair
///
/// Unknown email and wrong password both answer 401 "Invalid credentials".
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Session> {
    let Json(request) = payload?;
    let session = state.accounts.login(&request.email, &request.password).await?;
    Ok(ApiResponse::success(session))
}
