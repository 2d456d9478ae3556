use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::TokenType;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated identity extracted from a verified access token.
///
/// Lives in the request extensions for exactly one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers()).map_err(|reason| {
        tracing::warn!(path = %request.uri().path(), "rejected request: {}", reason);
        ApiError::unauthorized()
    })?;

    let user_id = state
        .tokens
        .verify(token, TokenType::Access)
        .map_err(|reason| {
            tracing::warn!(path = %request.uri().path(), "rejected token: {}", reason);
            ApiError::unauthorized()
        })?;

    tracing::debug!(user_id, "authenticated request");
    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}

/// Extract the bearer credential from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or("missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Authorization header is not valid ASCII")?;

    let (scheme, token) = auth_str
        .split_once(' ')
        .ok_or("Authorization header must use Bearer token format")?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err("Authorization header must use Bearer token format");
    }

    let token = token.trim();
    if token.is_empty() {
        return Err("empty bearer token");
    }

    Ok(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Reaching a handler without the gate in front of it is a routing bug.
        parts.extensions.get::<AuthUser>().copied().ok_or_else(|| {
            tracing::error!(path = %parts.uri.path(), "handler reached without authentication layer");
            ApiError::internal_server_error("Authentication context missing")
        })
    }
}
