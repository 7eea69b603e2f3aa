//! Route editor state machine
//!
//! Viewing, Creating and Selected are an explicit tagged union: a map click
//! outside Creating is a no-op because no match arm handles it, not because
//! a flag was checked. Selection carries a generation number so a road-path
//! response that arrives after the selection changed is discarded instead of
//! being rendered into the wrong state.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use crate::api::ClientError;
use crate::external::{sample_waypoints, RoadPath, MAX_WAYPOINTS};
use crate::models::{Coordinate, RouteSummary};

/// Persistence seam between the editor and the HTTP API, mockable in tests
#[async_trait]
pub trait RouteBackend: Send + Sync {
    async fn list_routes(&self) -> Result<Vec<RouteSummary>, ClientError>;
    async fn create_route(
        &self,
        name: &str,
        coordinates: &[Coordinate],
    ) -> Result<RouteSummary, ClientError>;
    async fn delete_route(&self, id: &str) -> Result<(), ClientError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorMode {
    Viewing,
    Creating {
        name: String,
        points: Vec<Coordinate>,
    },
    Selected {
        route_id: String,
        generation: u64,
    },
}

/// Hand-off to the road router for a freshly selected route.
/// Waypoints are already sampled to the external service's limit.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingRequest {
    pub route_id: String,
    pub generation: u64,
    pub waypoints: Vec<Coordinate>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    /// A new route was selected; the caller should compute its road path
    Selected(RoutingRequest),
    /// The selected route was clicked again
    Deselected,
    /// Unknown id, or selection ignored while creating
    Ignored,
}

#[derive(Debug, PartialEq)]
pub enum EditorError {
    NotCreating,
    Busy,
    MissingName,
    NotEnoughPoints,
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorError::NotCreating => write!(f, "Nenhuma rota em criação"),
            EditorError::Busy => write!(f, "Operação em andamento"),
            EditorError::MissingName => write!(f, "Informe um nome para a rota"),
            EditorError::NotEnoughPoints => write!(f, "A rota deve ter pelo menos 2 pontos"),
        }
    }
}

impl From<EditorError> for ClientError {
    fn from(e: EditorError) -> Self {
        ClientError::Invalid(e.to_string())
    }
}

pub struct Editor {
    routes: Vec<RouteSummary>,
    mode: EditorMode,
    generation: u64,
    /// In-flight guard: blocks duplicate submissions while a request runs
    busy: bool,
    pending_delete: Option<String>,
    filter: String,
    /// Road distance per route id, filled in as routing responses arrive
    distances: HashMap<String, f64>,
}

impl Editor {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            mode: EditorMode::Viewing,
            generation: 0,
            busy: false,
            pending_delete: None,
            filter: String::new(),
            distances: HashMap::new(),
        }
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn routes(&self) -> &[RouteSummary] {
        &self.routes
    }

    pub fn set_routes(&mut self, routes: Vec<RouteSummary>) {
        self.routes = routes;
    }

    pub fn set_filter(&mut self, query: &str) {
        self.filter = query.trim().to_lowercase();
    }

    /// Routes matching the current name filter, in list order
    pub fn visible_routes(&self) -> Vec<&RouteSummary> {
        self.routes
            .iter()
            .filter(|r| self.filter.is_empty() || r.name.to_lowercase().contains(&self.filter))
            .collect()
    }

    pub fn distance_for(&self, route_id: &str) -> Option<f64> {
        self.distances.get(route_id).copied()
    }

    // ---- Creation ----

    /// Enter Creating. Clears any selection; a no-op when already creating
    /// or while a request is in flight.
    pub fn start_creation(&mut self) -> bool {
        if self.busy || matches!(self.mode, EditorMode::Creating { .. }) {
            return false;
        }
        self.mode = EditorMode::Creating {
            name: String::new(),
            points: Vec::new(),
        };
        true
    }

    /// Append a point. Only Creating reacts; Viewing and Selected have no
    /// match arm for clicks, so the event dies here by construction.
    pub fn map_click(&mut self, lat: f64, lng: f64) {
        if let EditorMode::Creating { points, .. } = &mut self.mode {
            points.push(Coordinate { lat, lng });
        }
    }

    /// Remove the most recent point; false when there was nothing to undo
    pub fn undo_point(&mut self) -> bool {
        if let EditorMode::Creating { points, .. } = &mut self.mode {
            return points.pop().is_some();
        }
        false
    }

    pub fn set_name(&mut self, new_name: &str) {
        if let EditorMode::Creating { name, .. } = &mut self.mode {
            *name = new_name.trim().to_string();
        }
    }

    pub fn point_count(&self) -> usize {
        match &self.mode {
            EditorMode::Creating { points, .. } => points.len(),
            _ => 0,
        }
    }

    pub fn can_save(&self) -> bool {
        match &self.mode {
            EditorMode::Creating { name, points } => !name.is_empty() && points.len() >= 2,
            _ => false,
        }
    }

    pub fn cancel_creation(&mut self) {
        if matches!(self.mode, EditorMode::Creating { .. }) {
            self.mode = EditorMode::Viewing;
        }
    }

    /// Validate and mark the save in flight, handing back the payload.
    /// Must be paired with `finish_save` once the backend call resolves.
    pub fn begin_save(&mut self) -> Result<(String, Vec<Coordinate>), EditorError> {
        if self.busy {
            return Err(EditorError::Busy);
        }
        match &self.mode {
            EditorMode::Creating { name, points } => {
                if name.is_empty() {
                    return Err(EditorError::MissingName);
                }
                if points.len() < 2 {
                    return Err(EditorError::NotEnoughPoints);
                }
                self.busy = true;
                Ok((name.clone(), points.clone()))
            }
            _ => Err(EditorError::NotCreating),
        }
    }

    /// On success the editor returns to Viewing with the new route at the
    /// top of the list; on failure it stays in Creating so nothing is lost.
    pub fn finish_save(
        &mut self,
        saved: Result<RouteSummary, ClientError>,
    ) -> Result<(), ClientError> {
        self.busy = false;
        match saved {
            Ok(route) => {
                self.routes.insert(0, route);
                self.mode = EditorMode::Viewing;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Full save flow against a backend
    pub async fn save(&mut self, backend: &dyn RouteBackend) -> Result<(), ClientError> {
        let (name, points) = self.begin_save()?;
        let saved = backend.create_route(&name, &points).await;
        self.finish_save(saved)
    }

    // ---- Selection ----

    /// Toggle selection of a saved route. Ignored while creating. Selecting
    /// bumps the generation and emits the (sampled) routing hand-off.
    pub fn select_route(&mut self, id: &str) -> SelectOutcome {
        if matches!(self.mode, EditorMode::Creating { .. }) {
            return SelectOutcome::Ignored;
        }

        if let EditorMode::Selected { route_id, .. } = &self.mode {
            if route_id == id {
                self.mode = EditorMode::Viewing;
                return SelectOutcome::Deselected;
            }
        }

        let route = match self.routes.iter().find(|r| r.id == id) {
            Some(r) => r.clone(),
            None => return SelectOutcome::Ignored,
        };

        self.generation += 1;
        self.mode = EditorMode::Selected {
            route_id: route.id.clone(),
            generation: self.generation,
        };

        SelectOutcome::Selected(RoutingRequest {
            route_id: route.id,
            generation: self.generation,
            waypoints: sample_waypoints(&route.coordinates, MAX_WAYPOINTS),
        })
    }

    /// Accept a road-path response only if the selection that requested it
    /// is still current; stale generations are dropped.
    pub fn apply_road_path(&mut self, generation: u64, road: &RoadPath) -> bool {
        match &self.mode {
            EditorMode::Selected {
                route_id,
                generation: current,
            } if *current == generation => {
                self.distances
                    .insert(route_id.clone(), road.distance_meters);
                true
            }
            _ => false,
        }
    }

    pub fn selected_route(&self) -> Option<&RouteSummary> {
        match &self.mode {
            EditorMode::Selected { route_id, .. } => {
                self.routes.iter().find(|r| &r.id == route_id)
            }
            _ => None,
        }
    }

    // ---- Deletion (two-step) ----

    /// Stage a route for deletion; nothing is called until confirmed
    pub fn request_delete(&mut self, id: &str) -> bool {
        if self.routes.iter().any(|r| r.id == id) {
            self.pending_delete = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Remove the route locally once the backend confirmed the deletion
    pub fn complete_delete(&mut self, id: &str) {
        self.routes.retain(|r| r.id != id);
        self.distances.remove(id);
        if let EditorMode::Selected { route_id, .. } = &self.mode {
            if route_id == id {
                self.mode = EditorMode::Viewing;
            }
        }
    }

    /// Full confirm flow against a backend: deletes the staged route
    pub async fn confirm_delete(
        &mut self,
        backend: &dyn RouteBackend,
    ) -> Result<Option<String>, ClientError> {
        let id = match self.pending_delete.take() {
            Some(id) => id,
            None => return Ok(None),
        };
        if self.busy {
            self.pending_delete = Some(id);
            return Err(EditorError::Busy.into());
        }
        self.busy = true;
        let result = backend.delete_route(&id).await;
        self.busy = false;
        result?;
        self.complete_delete(&id);
        Ok(Some(id))
    }

    // ---- Loading ----

    pub async fn load_routes(&mut self, backend: &dyn RouteBackend) -> Result<(), ClientError> {
        let routes = backend.list_routes().await?;
        self.set_routes(routes);
        Ok(())
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}
