//! The derived, read-only network model.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use geo::Point;
use geojson::FeatureCollection;
use serde::Serialize;
use tracing::info;

use super::index::FeedIndex;
use super::paths::{DerivationReport, PathSummary, derive_paths};
use crate::config::FeedConfig;
use crate::feed::{Agency, CalendarDate, Feed, Station, TableReport};
use crate::geometry::{
    ModeClassifier, StationSize, collection, path_feature, point_feature, shape_features,
};
use crate::spatial;

/// Headsign used for departures whose trip has none.
const UNKNOWN_DESTINATION: &str = "Unknown";

/// What was dropped while building a [`Network`].
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub tables: Vec<TableReport>,
    pub derivation: DerivationReport,
    pub loaded_at: DateTime<Utc>,
}

/// One scheduled departure from a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Departure {
    pub trip_id: String,
    pub route_id: String,
    pub destination: String,
    pub departure_time: String,
}

/// A fully derived feed.
///
/// Built once per load by [`Network::build`] and never modified; a reload
/// produces a new `Network`.
#[derive(Debug)]
pub struct Network {
    index: FeedIndex,
    paths: Vec<PathSummary>,
    classifier: ModeClassifier,
    agencies: Vec<Agency>,
    calendar_dates: Vec<CalendarDate>,
    major_stations: HashSet<String>,
    diagnostics: Diagnostics,
}

impl Network {
    /// Index the feed and derive its paths.
    pub fn build(feed: Feed, config: &FeedConfig) -> Self {
        let Feed {
            stations,
            shapes,
            trips,
            stop_times,
            routes,
            agencies,
            calendar_dates,
            reports,
        } = feed;

        let index = FeedIndex::new(stations, shapes, trips, stop_times, routes);
        let classifier = ModeClassifier::new(config.mode_policy);
        let (paths, derivation) = derive_paths(&index, &classifier);

        info!(
            stations = index.stations().len(),
            routes = index.route_count(),
            trips = index.trips().len(),
            paths = paths.len(),
            policy = ?classifier.policy(),
            "network built"
        );

        Self {
            index,
            paths,
            classifier,
            agencies,
            calendar_dates,
            major_stations: config.major_stations.clone(),
            diagnostics: Diagnostics {
                tables: reports,
                derivation,
                loaded_at: Utc::now(),
            },
        }
    }

    /// Stations in source order.
    pub fn stations(&self) -> &[Arc<Station>] {
        self.index.stations()
    }

    pub fn station(&self, id: &str) -> Option<&Arc<Station>> {
        self.index.station(id)
    }

    /// Rail paths, deduplicated and sorted by name.
    pub fn path_summaries(&self) -> &[PathSummary] {
        &self.paths
    }

    pub fn nearest_station(&self, point: Point) -> Option<&Station> {
        spatial::nearest_station(point, self.stations().iter().map(|s| s.as_ref()))
    }

    /// Other stations served by any trip calling at `id`.
    ///
    /// Ordered by first appearance in the stop-times table (source order,
    /// not stop sequence). Stop ids that name no known station are left out.
    pub fn connected_stations(&self, id: &str) -> Vec<Arc<Station>> {
        let trips: HashSet<&str> = self
            .index
            .station_stop_times(id)
            .map(|call| call.trip_id.as_str())
            .collect();

        let mut seen = HashSet::new();
        let mut connected = Vec::new();
        for stop_time in self.index.stop_times() {
            if stop_time.stop_id == id || !trips.contains(stop_time.trip_id.as_str()) {
                continue;
            }
            if !seen.insert(stop_time.stop_id.as_str()) {
                continue;
            }
            if let Some(station) = self.index.station(&stop_time.stop_id) {
                connected.push(Arc::clone(station));
            }
        }

        connected
    }

    /// Up to `limit` departures from `id`, earliest first.
    ///
    /// Times are compared as strings; `HH:MM:SS` with a zero-padded hour
    /// sorts correctly, including service past midnight (`25:10:00`).
    pub fn departures(&self, id: &str, limit: usize) -> Vec<Departure> {
        let mut calls: Vec<_> = self.index.station_stop_times(id).collect();
        calls.sort_by(|a, b| a.departure_time.cmp(&b.departure_time));

        calls
            .into_iter()
            .take(limit)
            .map(|call| {
                let trip = self.index.trip(&call.trip_id);
                let destination = trip
                    .map(|t| t.headsign.as_str())
                    .filter(|h| !h.is_empty())
                    .unwrap_or(UNKNOWN_DESTINATION);
                Departure {
                    trip_id: call.trip_id.clone(),
                    route_id: trip.map(|t| t.route_id.clone()).unwrap_or_default(),
                    destination: destination.to_string(),
                    departure_time: call.departure_time.clone(),
                }
            })
            .collect()
    }

    pub fn station_size(&self, id: &str) -> StationSize {
        if self.major_stations.contains(id) {
            StationSize::Major
        } else {
            StationSize::Minor
        }
    }

    pub fn station_features(&self) -> FeatureCollection {
        collection(
            self.stations()
                .iter()
                .map(|s| point_feature(s, self.station_size(&s.id)))
                .collect(),
        )
    }

    pub fn path_features(&self) -> FeatureCollection {
        collection(self.paths.iter().filter_map(path_feature).collect())
    }

    /// Every raw shape as a line, whether or not a path uses it.
    pub fn shape_features(&self) -> FeatureCollection {
        collection(shape_features(self.index.shapes(), &self.classifier))
    }

    pub fn agencies(&self) -> &[Agency] {
        &self.agencies
    }

    pub fn calendar_dates(&self) -> &[CalendarDate] {
        &self.calendar_dates
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}
