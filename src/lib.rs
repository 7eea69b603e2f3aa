//! RouteSaver API
//!
//! REST backend for saving and visualizing named geographic routes.
//! The router is built here so both the server binary and the e2e test
//! suite can mount the same application.

use axum::{extract::Extension, middleware, Router};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod common;
pub mod logging_middleware;
pub mod routes;

pub use common::{AppState, SharedState};

/// Compose the full application router over the given shared state.
/// CORS is layered on by the binary, where the allowed origins are known.
pub fn build_router(shared: SharedState) -> Router {
    Router::new()
        .merge(auth::auth_routes())
        .merge(routes::route_routes())
        .layer(middleware::from_fn(
            logging_middleware::log_request_response,
        ))
        .layer(Extension(shared))
        .layer(TraceLayer::new_for_http())
}
