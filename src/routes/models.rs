use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;

/// A single latitude/longitude pair. Order inside a route is significant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

/// Route database model.
///
/// The `coordinates` column holds the ordered point sequence as JSON text;
/// API responses expose it as an array via the field (de)serializers below.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Route {
    pub id: String,
    pub name: String,
    #[serde(
        serialize_with = "serialize_coordinates",
        deserialize_with = "deserialize_coordinates"
    )]
    pub coordinates: String,
    pub user_id: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Route {
    /// Parsed view of the stored point sequence
    pub fn points(&self) -> Vec<Coordinate> {
        serde_json::from_str(&self.coordinates).unwrap_or_default()
    }
}

/// Missing fields deserialize as empty so validation owns the rejection
#[derive(Debug, Deserialize)]
pub struct CreateRouteRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub coordinates: Vec<Coordinate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRouteRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub coordinates: Vec<Coordinate>,
}

/// Serializes the JSON-text coordinates column as an array for API responses
fn serialize_coordinates<S>(raw: &str, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let coords: Vec<Coordinate> = serde_json::from_str(raw).unwrap_or_default();
    coords.serialize(serializer)
}

/// Deserializes a coordinate array into the JSON text stored in the column
fn deserialize_coordinates<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let coords: Vec<Coordinate> = Vec::deserialize(deserializer)?;
    serde_json::to_string(&coords).map_err(serde::de::Error::custom)
}
