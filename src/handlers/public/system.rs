// handlers/public/system.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - Service name, version and endpoint map
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Inventory API",
            "version": version,
            "description": "Personal inventory service with token authentication",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/auth/register, /auth/login, /auth/refresh (public - token acquisition)",
                "users": "POST /users (public), /users[/:id] (protected)",
                "items": "/items[/:id], /items/page, /items/date, /items/date-range, /items/user/:user_id, /items/location/:location_id[/date] (protected)",
                "locations": "/locations[/:id] (protected)",
            }
        }
    }))
}

/// GET /health - Liveness plus a store ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok",
                    "backend": state.store.backend(),
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database": "unavailable",
                        "backend": state.store.backend(),
                    }
                })),
            )
        }
    }
}
