//! External mapping collaborators
//!
//! Road routing and geocoding are delegated to public services (OSRM demo
//! server and Nominatim). Both sit behind narrow traits so the editor and
//! the tests never depend on the network. Any hand-off to an external
//! service first samples the point sequence down to `MAX_WAYPOINTS`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::api::ClientError;
use crate::models::Coordinate;

/// Practical waypoint limit of the external routing services
pub const MAX_WAYPOINTS: usize = 25;

pub const OSRM_BASE: &str = "https://router.project-osrm.org";
pub const NOMINATIM_BASE: &str = "https://nominatim.openstreetmap.org";

/// A road-following path with its total travel distance
#[derive(Debug, Clone, PartialEq)]
pub struct RoadPath {
    pub path: Vec<Coordinate>,
    pub distance_meters: f64,
}

/// A geocoding hit the user can recenter the map on
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

#[async_trait]
pub trait RoadRouter: Send + Sync {
    async fn compute_road_path(&self, points: &[Coordinate]) -> Result<RoadPath, ClientError>;
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search_places(&self, query: &str) -> Result<Vec<Place>, ClientError>;
}

/// Reduce a point sequence to at most `max` representative points:
/// always the first and last, with evenly spaced indices in between.
/// Relative order is preserved.
pub fn sample_waypoints(coords: &[Coordinate], max: usize) -> Vec<Coordinate> {
    if coords.len() <= max || max < 2 {
        return coords.to_vec();
    }

    let mut result = vec![coords[0]];
    let step = (coords.len() - 1) as f64 / (max - 1) as f64;
    for i in 1..max - 1 {
        let idx = (i as f64 * step).round() as usize;
        result.push(coords[idx]);
    }
    result.push(coords[coords.len() - 1]);
    result
}

/// Google Maps directions deep link for a route, sampled to the same limit
pub fn google_maps_url(coords: &[Coordinate]) -> String {
    let sampled = sample_waypoints(coords, MAX_WAYPOINTS);
    let path: Vec<String> = sampled
        .iter()
        .map(|c| format!("{},{}", c.lat, c.lng))
        .collect();
    format!("https://www.google.com/maps/dir/{}", path.join("/"))
}

pub fn format_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{:.1} km", meters / 1000.0)
    } else {
        format!("{} m", meters.round() as i64)
    }
}

// ---- OSRM ----

pub struct OsrmRouter {
    http: Client,
    base: String,
}

impl OsrmRouter {
    pub fn new() -> Self {
        Self::with_base(OSRM_BASE.to_string())
    }

    pub fn with_base(base: String) -> Self {
        Self {
            http: Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for OsrmRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// OSRM expects "lng,lat;lng,lat;..." in the path segment
fn osrm_waypoint_path(points: &[Coordinate]) -> String {
    points
        .iter()
        .map(|c| format!("{},{}", c.lng, c.lat))
        .collect::<Vec<_>>()
        .join(";")
}

#[derive(Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    distance: f64,
    geometry: OsrmGeometry,
}

#[derive(Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

fn parse_osrm_response(value: Value) -> Result<RoadPath, ClientError> {
    let response: OsrmResponse = serde_json::from_value(value)
        .map_err(|e| ClientError::Api(format!("resposta OSRM inválida: {}", e)))?;

    if response.code != "Ok" {
        return Err(ClientError::Api(format!(
            "serviço de rotas recusou a consulta: {}",
            response.code
        )));
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| ClientError::Api("nenhum trajeto encontrado".to_string()))?;

    // GeoJSON order is [lng, lat]
    let path = route
        .geometry
        .coordinates
        .into_iter()
        .map(|[lng, lat]| Coordinate { lat, lng })
        .collect();

    Ok(RoadPath {
        path,
        distance_meters: route.distance,
    })
}

#[async_trait]
impl RoadRouter for OsrmRouter {
    async fn compute_road_path(&self, points: &[Coordinate]) -> Result<RoadPath, ClientError> {
        if points.len() < 2 {
            return Err(ClientError::Invalid(
                "A rota deve ter pelo menos 2 pontos".to_string(),
            ));
        }

        let sampled = sample_waypoints(points, MAX_WAYPOINTS);
        let url = format!(
            "{}/route/v1/driving/{}",
            self.base,
            osrm_waypoint_path(&sampled)
        );

        let value: Value = self
            .http
            .get(&url)
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await?
            .json()
            .await?;

        parse_osrm_response(value)
    }
}

// ---- Nominatim ----

pub struct NominatimGeocoder {
    http: Client,
    base: String,
}

impl NominatimGeocoder {
    pub fn new() -> Self {
        Self::with_base(NOMINATIM_BASE.to_string())
    }

    pub fn with_base(base: String) -> Self {
        Self {
            http: Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for NominatimGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct NominatimPlace {
    display_name: String,
    lat: String,
    lon: String,
}

fn parse_nominatim_response(value: Value) -> Result<Vec<Place>, ClientError> {
    let hits: Vec<NominatimPlace> = serde_json::from_value(value)
        .map_err(|e| ClientError::Api(format!("resposta de geocodificação inválida: {}", e)))?;

    // Entries with unparseable coordinates are skipped rather than fatal
    Ok(hits
        .into_iter()
        .filter_map(|p| {
            let lat = p.lat.parse::<f64>().ok()?;
            let lng = p.lon.parse::<f64>().ok()?;
            Some(Place {
                name: p.display_name,
                lat,
                lng,
            })
        })
        .collect())
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search_places(&self, query: &str) -> Result<Vec<Place>, ClientError> {
        let value: Value = self
            .http
            .get(format!("{}/search", self.base))
            .query(&[("format", "json"), ("limit", "5"), ("q", query)])
            .header("Accept-Language", "pt-BR")
            .header("User-Agent", "routesaver-cli/0.1")
            .send()
            .await?
            .json()
            .await?;

        parse_nominatim_response(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(n: usize) -> Vec<Coordinate> {
        (0..n)
            .map(|i| Coordinate {
                lat: i as f64,
                lng: i as f64 * 2.0,
            })
            .collect()
    }

    #[test]
    fn test_sample_waypoints_caps_at_max() {
        let sampled = sample_waypoints(&coords(30), 25);
        assert_eq!(sampled.len(), 25);
    }

    #[test]
    fn test_sample_waypoints_keeps_endpoints() {
        let original = coords(30);
        let sampled = sample_waypoints(&original, 25);
        assert_eq!(sampled[0], original[0]);
        assert_eq!(sampled[24], original[29]);
    }

    #[test]
    fn test_sample_waypoints_preserves_order() {
        let sampled = sample_waypoints(&coords(100), 25);
        for pair in sampled.windows(2) {
            assert!(
                pair[0].lat < pair[1].lat,
                "sampled points must keep their original relative order"
            );
        }
    }

    #[test]
    fn test_sample_waypoints_short_input_unchanged() {
        let original = coords(10);
        assert_eq!(sample_waypoints(&original, 25), original);

        let exact = coords(25);
        assert_eq!(sample_waypoints(&exact, 25), exact);
    }

    #[test]
    fn test_google_maps_url_samples_long_routes() {
        let url = google_maps_url(&coords(60));
        assert!(url.starts_with("https://www.google.com/maps/dir/"));
        let segments = url
            .trim_start_matches("https://www.google.com/maps/dir/")
            .split('/')
            .count();
        assert_eq!(segments, 25);
        assert!(url.ends_with("59,118"));
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(340.4), "340 m");
        assert_eq!(format_distance(999.0), "999 m");
        assert_eq!(format_distance(1000.0), "1.0 km");
        assert_eq!(format_distance(12345.0), "12.3 km");
    }

    #[test]
    fn test_osrm_waypoint_path_is_lng_lat() {
        let path = osrm_waypoint_path(&[
            Coordinate {
                lat: -15.78,
                lng: -47.93,
            },
            Coordinate {
                lat: -15.8,
                lng: -47.95,
            },
        ]);
        assert_eq!(path, "-47.93,-15.78;-47.95,-15.8");
    }

    #[test]
    fn test_parse_osrm_response_ok() {
        let value = serde_json::json!({
            "code": "Ok",
            "routes": [{
                "distance": 1532.7,
                "geometry": {
                    "coordinates": [[-47.93, -15.78], [-47.95, -15.8]]
                }
            }]
        });

        let road = parse_osrm_response(value).unwrap();
        assert_eq!(road.distance_meters, 1532.7);
        assert_eq!(road.path.len(), 2);
        // GeoJSON [lng, lat] flips into Coordinate {lat, lng}
        assert_eq!(road.path[0].lat, -15.78);
        assert_eq!(road.path[0].lng, -47.93);
    }

    #[test]
    fn test_parse_osrm_response_error_code() {
        let value = serde_json::json!({ "code": "NoRoute", "routes": [] });
        assert!(parse_osrm_response(value).is_err());
    }

    #[test]
    fn test_parse_nominatim_response() {
        let value = serde_json::json!([
            { "display_name": "Brasília, DF", "lat": "-15.78", "lon": "-47.93" },
            { "display_name": "lixo", "lat": "abc", "lon": "-47.93" }
        ]);

        let places = parse_nominatim_response(value).unwrap();
        assert_eq!(places.len(), 1, "unparseable coordinates are skipped");
        assert_eq!(places[0].name, "Brasília, DF");
        assert_eq!(places[0].lat, -15.78);
        assert_eq!(places[0].lng, -47.93);
    }
}
