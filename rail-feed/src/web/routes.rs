//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use geo::Point;
use geojson::FeatureCollection;
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::dto::*;
use super::state::AppState;
use crate::network::Diagnostics;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stations", get(list_stations))
        .route("/api/stations/nearest", get(nearest_station))
        .route("/api/stations/:id", get(get_station))
        .route("/api/stations/:id/connected", get(connected_stations))
        .route("/api/stations/:id/departures", get(departures))
        .route("/api/paths", get(list_paths))
        .route("/api/features/stations", get(station_features))
        .route("/api/features/paths", get(path_features))
        .route("/api/features/shapes", get(shape_features))
        .route("/api/diagnostics", get(diagnostics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn list_stations(State(state): State<AppState>) -> Json<StationsResponse> {
    let network = state.network.snapshot().await;
    let stations = network
        .stations()
        .iter()
        .map(|s| StationResult::from_station(s))
        .collect();
    Json(StationsResponse { stations })
}

async fn get_station(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StationResult>, AppError> {
    let network = state.network.snapshot().await;
    let station = network.station(&id).ok_or_else(|| unknown_station(&id))?;
    Ok(Json(StationResult::from_station(station)))
}

async fn nearest_station(
    State(state): State<AppState>,
    Query(req): Query<NearestRequest>,
) -> Result<Json<StationResult>, AppError> {
    if !(-90.0..=90.0).contains(&req.lat) || !(-180.0..=180.0).contains(&req.lon) {
        return Err(AppError::BadRequest {
            message: format!("Coordinates out of range: {}, {}", req.lat, req.lon),
        });
    }

    let network = state.network.snapshot().await;
    let station = network
        .nearest_station(Point::new(req.lon, req.lat))
        .ok_or_else(|| AppError::NotFound {
            message: "No stations loaded".to_string(),
        })?;
    Ok(Json(StationResult::from_station(station)))
}

async fn connected_stations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StationsResponse>, AppError> {
    let network = state.network.snapshot().await;
    if network.station(&id).is_none() {
        return Err(unknown_station(&id));
    }

    let stations = network
        .connected_stations(&id)
        .iter()
        .map(|s| StationResult::from_station(s))
        .collect();
    Ok(Json(StationsResponse { stations }))
}

async fn departures(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(req): Query<DeparturesRequest>,
) -> Result<Json<DeparturesResponse>, AppError> {
    let network = state.network.snapshot().await;
    if network.station(&id).is_none() {
        return Err(unknown_station(&id));
    }

    let departures = network.departures(&id, req.limit());
    Ok(Json(DeparturesResponse {
        station: id,
        departures,
    }))
}

async fn list_paths(State(state): State<AppState>) -> Json<PathsResponse> {
    let network = state.network.snapshot().await;
    let paths = network
        .path_summaries()
        .iter()
        .map(PathResult::from_path)
        .collect();
    Json(PathsResponse { paths })
}

async fn station_features(State(state): State<AppState>) -> Json<FeatureCollection> {
    Json(state.network.snapshot().await.station_features())
}

async fn path_features(State(state): State<AppState>) -> Json<FeatureCollection> {
    Json(state.network.snapshot().await.path_features())
}

async fn shape_features(State(state): State<AppState>) -> Json<FeatureCollection> {
    Json(state.network.snapshot().await.shape_features())
}

async fn diagnostics(State(state): State<AppState>) -> Json<Diagnostics> {
    Json(state.network.snapshot().await.diagnostics().clone())
}

fn unknown_station(id: &str) -> AppError {
    AppError::NotFound {
        message: format!("Unknown station: {id}"),
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };

        warn!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
