//! Route endpoints
//!
//! All of these require authentication; the AuthedUser extractor rejects
//! unauthenticated requests before the handlers run.

use axum::{routing::get, Router};

use super::handlers;

/// Creates and returns the route CRUD router
///
/// # Routes
/// - `GET /api/routes` - List the user's routes
/// - `POST /api/routes` - Create a route
/// - `GET /api/routes/:id` - Get one route
/// - `PUT /api/routes/:id` - Replace a route
/// - `DELETE /api/routes/:id` - Delete a route
pub fn route_routes() -> Router {
    Router::new()
        .route(
            "/api/routes",
            get(handlers::list_routes).post(handlers::create_route),
        )
        .route(
            "/api/routes/:id",
            get(handlers::get_route)
                .put(handlers::update_route)
                .delete(handlers::delete_route),
        )
}
