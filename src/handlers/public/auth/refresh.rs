// handlers/public/auth/refresh.rs - POST /auth/refresh handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::auth::TokenPair;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /auth/refresh - Mint a new pair from a refresh token
pub async fn refresh_post(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<TokenPair> {
    let Json(request) = payload?;
    let tokens = state.accounts.refresh(&request.refresh_token).await?;
    Ok(ApiResponse::success(tokens))
}
