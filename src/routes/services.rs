use sqlx::SqlitePool;
use tracing::info;

use super::models::{CreateRouteRequest, Route, UpdateRouteRequest};
use crate::common::{generate_route_id, ApiError, Validator};

/// Route CRUD, always scoped to the owning user.
///
/// Every statement filters on `user_id = ?`, so a route belonging to a
/// different user is indistinguishable from a missing one: both come back
/// as 404 "Rota não encontrada".
pub struct RoutesService {
    db: SqlitePool,
}

impl RoutesService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// All routes for the user, newest first
    pub async fn list_routes(&self, user_id: &str) -> Result<Vec<Route>, ApiError> {
        let routes = sqlx::query_as::<_, Route>(
            r#"
            SELECT id, name, coordinates, user_id, created_at, updated_at
            FROM routes
            WHERE user_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        Ok(routes)
    }

    pub async fn get_route(&self, user_id: &str, route_id: &str) -> Result<Route, ApiError> {
        let route = sqlx::query_as::<_, Route>(
            r#"
            SELECT id, name, coordinates, user_id, created_at, updated_at
            FROM routes
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(route_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("Rota não encontrada".to_string()))?;

        Ok(route)
    }

    pub async fn create_route(
        &self,
        user_id: &str,
        request: CreateRouteRequest,
    ) -> Result<Route, ApiError> {
        let validation = request.validate(&request);
        if !validation.is_valid {
            return Err(ApiError::from(validation));
        }

        let route_id = generate_route_id();
        let now = chrono::Utc::now().to_rfc3339();
        let coordinates_json = serde_json::to_string(&request.coordinates)
            .map_err(|e| ApiError::InternalServer(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO routes (id, user_id, name, coordinates, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&route_id)
        .bind(user_id)
        .bind(request.name.trim())
        .bind(&coordinates_json)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        info!(route_id = %route_id, user_id = %user_id, "Route created");

        self.get_route(user_id, &route_id).await
    }

    /// Full replace of name and point sequence
    pub async fn update_route(
        &self,
        user_id: &str,
        route_id: &str,
        request: UpdateRouteRequest,
    ) -> Result<Route, ApiError> {
        // Validation runs before any write, so a rejected update leaves the
        // stored route untouched
        let validation = request.validate(&request);
        if !validation.is_valid {
            return Err(ApiError::from(validation));
        }

        let now = chrono::Utc::now().to_rfc3339();
        let coordinates_json = serde_json::to_string(&request.coordinates)
            .map_err(|e| ApiError::InternalServer(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE routes
            SET name = ?, coordinates = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(request.name.trim())
        .bind(&coordinates_json)
        .bind(&now)
        .bind(route_id)
        .bind(user_id)
        .execute(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Rota não encontrada".to_string()));
        }

        info!(route_id = %route_id, user_id = %user_id, "Route updated");

        self.get_route(user_id, route_id).await
    }

    pub async fn delete_route(&self, user_id: &str, route_id: &str) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM routes WHERE id = ? AND user_id = ?")
            .bind(route_id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Rota não encontrada".to_string()));
        }

        info!(route_id = %route_id, user_id = %user_id, "Route deleted");

        Ok(())
    }
}
