// handlers/public/auth/register.rs - POST /auth/register handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{NewAccount, Session};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl From<RegisterRequest> for NewAccount {
    fn from(req: RegisterRequest) -> Self {
        NewAccount {
            name: req.name,
            email: req.email,
            password: req.password,
        }
    }
}

/**
 * POST /auth/register - Create an account and sign it in
 *
 * Expected Input:
 * ```json
 * { "name": "Alice", "email": "alice@example.com", "password": "wonderland" }
 * ```
 *
 * Returns 201 with `{user, access_token, refresh_token, token_type, expires_in}`.
 * 400 on a malformed email or short password, 409 when the email is taken.
 */
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Session> {
    let Json(request) = payload?;
    let session = state.accounts.register(request.into()).await?;
    Ok(ApiResponse::created(session))
}
