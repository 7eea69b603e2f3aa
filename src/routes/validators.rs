use super::models::{Coordinate, CreateRouteRequest, UpdateRouteRequest};
use crate::common::{ValidationResult, Validator};

/// Shared rules for create and update: both are full-payload writes
fn validate_route_payload(name: &str, coordinates: &[Coordinate]) -> ValidationResult {
    let mut result = ValidationResult::new();

    if name.trim().is_empty() {
        result.add_error("name", "Nome da rota é obrigatório");
    }

    if name.len() > 200 {
        result.add_error("name", "Nome deve ter no máximo 200 caracteres");
    }

    if coordinates.len() < 2 {
        result.add_error("coordinates", "A rota deve ter pelo menos 2 pontos");
    }

    result
}

impl Validator<CreateRouteRequest> for CreateRouteRequest {
    fn validate(&self, data: &CreateRouteRequest) -> ValidationResult {
        validate_route_payload(&data.name, &data.coordinates)
    }
}

impl Validator<UpdateRouteRequest> for UpdateRouteRequest {
    fn validate(&self, data: &UpdateRouteRequest) -> ValidationResult {
        validate_route_payload(&data.name, &data.coordinates)
    }
}
