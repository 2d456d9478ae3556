use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(public::system::root))
        .route("/health", get(public::system::health))
        .merge(auth_public_routes())
        .merge(user_public_routes())
        // Protected
        .merge(protected_routes(state.clone()));

    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config.security));
    }
    if state.config.server.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
        .route("/auth/refresh", post(auth::refresh_post))
}

fn user_public_routes() -> Router<AppState> {
    Router::new().route("/users", post(public::users::user_create))
}

/// Everything behind the bearer gate. `route_layer` keeps unmatched paths as 404s
/// instead of 401s.
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(user_routes())
        .merge(item_routes())
        .merge(location_routes())
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn user_routes() -> Router<AppState> {
    use protected::users;

    Router::new()
        .route("/users", get(users::user_list))
        .route(
            "/users/:id",
            get(users::user_get)
                .put(users::user_update)
                .delete(users::user_delete),
        )
}

fn item_routes() -> Router<AppState> {
    use protected::items;

    Router::new()
        .route("/items", get(items::item_list).post(items::item_create))
        .route("/items/page", get(items::items_by_page))
        .route("/items/date", get(items::items_by_date))
        .route("/items/date-range", get(items::items_by_date_range))
        .route("/items/user/:user_id", get(items::items_by_user))
        .route("/items/location/:location_id", get(items::items_by_location))
        .route(
            "/items/location/:location_id/date",
            get(items::items_by_location_and_date),
        )
        .route(
            "/items/:id",
            get(items::item_get)
                .put(items::item_update)
                .delete(items::item_delete),
        )
}

fn location_routes() -> Router<AppState> {
    use protected::locations;

    Router::new()
        .route(
            "/locations",
            get(locations::location_list).post(locations::location_create),
        )
        .route(
            "/locations/:id",
            get(locations::location_get)
                .put(locations::location_update)
                .delete(locations::location_delete),
        )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
