//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::feed::Station;
use crate::geometry::Mode;
use crate::network::{Departure, PathSummary};

/// Default number of departures returned.
pub const DEFAULT_DEPARTURES: usize = 5;

/// Upper bound on requested departures.
pub const MAX_DEPARTURES: usize = 100;

/// Query for the station nearest a point.
#[derive(Debug, Deserialize)]
pub struct NearestRequest {
    pub lat: f64,
    pub lon: f64,
}

/// Query for a station's departures.
#[derive(Debug, Deserialize)]
pub struct DeparturesRequest {
    pub limit: Option<usize>,
}

impl DeparturesRequest {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_DEPARTURES).min(MAX_DEPARTURES)
    }
}

/// A station in responses.
#[derive(Debug, Serialize)]
pub struct StationResult {
    pub id: String,
    pub code: String,
    pub name: String,
    pub zone_id: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_station: Option<String>,
}

/// List of stations.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub stations: Vec<StationResult>,
}

/// A derived path in responses.
#[derive(Debug, Serialize)]
pub struct PathResult {
    pub shape_id: String,
    pub route_id: String,
    pub name: String,
    pub mode: Mode,
    pub origin: String,
    pub destination: String,
    /// Station ids in visiting order
    pub stations: Vec<String>,
    /// Number of shape points; zero when the shape is missing
    pub shape_points: usize,
}

/// List of derived paths.
#[derive(Debug, Serialize)]
pub struct PathsResponse {
    pub paths: Vec<PathResult>,
}

/// Departures from one station.
#[derive(Debug, Serialize)]
pub struct DeparturesResponse {
    pub station: String,
    pub departures: Vec<Departure>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl StationResult {
    pub fn from_station(station: &Station) -> Self {
        Self {
            id: station.id.clone(),
            code: station.code.clone(),
            name: station.name.clone(),
            zone_id: station.zone_id.clone(),
            lat: station.lat,
            lon: station.lon,
            parent_station: station.parent_station.clone(),
        }
    }
}

impl PathResult {
    pub fn from_path(path: &PathSummary) -> Self {
        Self {
            shape_id: path.shape_id.clone(),
            route_id: path.route_id.clone(),
            name: path.name.clone(),
            mode: path.mode,
            origin: path.origin.id.clone(),
            destination: path.destination.id.clone(),
            stations: path.stations.iter().map(|s| s.id.clone()).collect(),
            shape_points: path.geometry.len(),
        }
    }
}
