use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::models::{CreateRouteRequest, UpdateRouteRequest};
use super::services::RoutesService;
use crate::auth::AuthedUser;
use crate::common::{ApiError, SharedState};

/// GET /api/routes - List the authenticated user's routes, newest first
pub async fn list_routes(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let service = RoutesService::new(app_state.db.clone());

    let routes = service.list_routes(&user.id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "count": routes.len(),
        "data": routes,
    })))
}

/// GET /api/routes/:id - Get a single route
pub async fn get_route(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    Path(route_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let service = RoutesService::new(app_state.db.clone());

    let route = service.get_route(&user.id, &route_id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": route,
    })))
}

/// POST /api/routes - Create a new route
pub async fn create_route(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    Json(request): Json<CreateRouteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let service = RoutesService::new(app_state.db.clone());

    let route = service.create_route(&user.id, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "data": route,
        })),
    ))
}

/// PUT /api/routes/:id - Replace a route's name and point sequence
pub async fn update_route(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    Path(route_id): Path<String>,
    Json(request): Json<UpdateRouteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let service = RoutesService::new(app_state.db.clone());

    let route = service.update_route(&user.id, &route_id, request).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": route,
    })))
}

/// DELETE /api/routes/:id - Delete a route
pub async fn delete_route(
    Extension(state): Extension<SharedState>,
    user: AuthedUser,
    Path(route_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let service = RoutesService::new(app_state.db.clone());

    service.delete_route(&user.id, &route_id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Rota excluída com sucesso",
    })))
}
