//! Authentication routes

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::extractors::require_auth;
use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET /auth/me` - Current user (bearer access token required)
/// - `POST /auth/refresh` - New access token from a refresh token
/// - `GET /auth/{provider}` - Redirect to the provider's consent page
/// - `GET /auth/{provider}/redirect` - Provider callback, issues tokens
pub fn auth_routes() -> Router {
    Router::new()
        .route(
            "/auth/me",
            get(handlers::me_handler).route_layer(middleware::from_fn(require_auth)),
        )
        .route("/auth/refresh", post(handlers::refresh_handler))
        .route("/auth/:provider", get(handlers::login_start))
        .route("/auth/:provider/redirect", get(handlers::redirect_callback))
}
