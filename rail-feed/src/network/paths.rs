//! Path derivation.
//!
//! Joins trips, stop times, stations, shapes and routes into one
//! [`PathSummary`] per distinct rail path:
//!
//! 1. The first trip that references a shape represents that shape.
//! 2. Shapes whose service classifies as road are dropped.
//! 3. The representative's stop times, in sequence order, become the
//!    station list. Stop times naming unknown stations are skipped; a
//!    shape with no resolvable station is dropped.
//! 4. Paths sharing a route and both terminals collapse into one, keeping
//!    the one that visits the most stations (first seen on a tie).
//! 5. The result is sorted by display name.
//!
//! Nothing here fails: every fault skips one shape or one stop time and is
//! counted in the [`DerivationReport`].

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, trace};

use super::index::FeedIndex;
use crate::feed::{ShapePoint, Station, Trip};
use crate::geometry::{Mode, ModeClassifier};

/// One logical rail route between two terminal stations.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSummary {
    pub shape_id: String,
    pub route_id: String,
    /// `<route label> <origin> → <destination>`
    pub name: String,
    pub mode: Mode,
    pub origin: Arc<Station>,
    pub destination: Arc<Station>,
    /// Stations visited by the representative trip, never empty.
    pub stations: Vec<Arc<Station>>,
    /// Shape points by ascending sequence; empty when the shape has none.
    pub geometry: Vec<ShapePoint>,
}

impl PathSummary {
    /// `(route id, origin id, destination id)`; equal keys are duplicates.
    pub fn dedup_key(&self) -> (&str, &str, &str) {
        (&self.route_id, &self.origin.id, &self.destination.id)
    }
}

/// Counters describing what derivation skipped or merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivationReport {
    /// Distinct shapes that had a representative trip.
    pub shapes_considered: usize,
    /// Shapes dropped because their service is road-based.
    pub road_shapes: usize,
    /// Trips without a shape id; these never represent a path.
    pub shapeless_trips: usize,
    /// Stop times on representative trips whose station is unknown.
    pub unresolved_stop_times: usize,
    /// Rail shapes whose trip resolved no station at all.
    pub empty_paths: usize,
    /// Representative trips whose route id is not in the routes table.
    pub unknown_routes: usize,
    /// Paths discarded in favour of another with the same key.
    pub duplicates_collapsed: usize,
    /// Paths in the final result.
    pub paths: usize,
}

/// Build the deduplicated, sorted rail path set.
pub fn derive_paths(
    index: &FeedIndex,
    classifier: &ModeClassifier,
) -> (Vec<PathSummary>, DerivationReport) {
    let mut report = DerivationReport::default();
    let mut seen_shapes: HashSet<&str> = HashSet::new();
    let mut paths: Vec<PathSummary> = Vec::new();
    let mut slots: HashMap<(String, String, String), usize> = HashMap::new();

    for trip in index.trips() {
        if trip.shape_id.is_empty() {
            report.shapeless_trips += 1;
            continue;
        }
        if !seen_shapes.insert(trip.shape_id.as_str()) {
            continue;
        }
        report.shapes_considered += 1;

        let Some(summary) = summarize(index, classifier, trip, &mut report) else {
            continue;
        };

        let key = summary.dedup_key();
        let key = (key.0.to_string(), key.1.to_string(), key.2.to_string());
        match slots.entry(key) {
            Entry::Occupied(slot) => {
                report.duplicates_collapsed += 1;
                let kept = &mut paths[*slot.get()];
                if summary.stations.len() > kept.stations.len() {
                    debug!(
                        kept = %summary.shape_id,
                        dropped = %kept.shape_id,
                        "longer path replaces duplicate"
                    );
                    *kept = summary;
                } else {
                    trace!(kept = %kept.shape_id, dropped = %summary.shape_id, "duplicate path");
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(paths.len());
                paths.push(summary);
            }
        }
    }

    paths.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.shape_id.cmp(&b.shape_id))
    });
    report.paths = paths.len();

    info!(
        paths = report.paths,
        road_shapes = report.road_shapes,
        duplicates = report.duplicates_collapsed,
        unresolved_stop_times = report.unresolved_stop_times,
        "derived paths"
    );

    (paths, report)
}

/// Summarize one representative trip, or `None` if its shape is skipped.
fn summarize(
    index: &FeedIndex,
    classifier: &ModeClassifier,
    trip: &Trip,
    report: &mut DerivationReport,
) -> Option<PathSummary> {
    let route = index.route(&trip.route_id);
    if route.is_none() {
        report.unknown_routes += 1;
    }

    let mode = classifier.classify(&trip.route_id, route, &trip.shape_id);
    if mode == Mode::Road {
        trace!(shape_id = %trip.shape_id, route_id = %trip.route_id, "skipping road shape");
        report.road_shapes += 1;
        return None;
    }

    let mut stations = Vec::new();
    for stop_time in index.trip_stop_times(&trip.id) {
        match index.station(&stop_time.stop_id) {
            Some(station) => stations.push(Arc::clone(station)),
            None => {
                trace!(trip_id = %trip.id, stop_id = %stop_time.stop_id, "unknown stop");
                report.unresolved_stop_times += 1;
            }
        }
    }

    let (Some(origin), Some(destination)) = (stations.first(), stations.last()) else {
        trace!(shape_id = %trip.shape_id, trip_id = %trip.id, "no stations resolved");
        report.empty_paths += 1;
        return None;
    };
    let (origin, destination) = (Arc::clone(origin), Arc::clone(destination));

    let label = route.map(|r| r.label()).unwrap_or(&trip.route_id);
    let name = format!("{label} {} → {}", origin.name, destination.name);

    Some(PathSummary {
        shape_id: trip.shape_id.clone(),
        route_id: trip.route_id.clone(),
        name,
        mode,
        origin,
        destination,
        stations,
        geometry: index.shape(&trip.shape_id).to_vec(),
    })
}
