//! Lookup structures over normalized tables.
//!
//! Built once per load and never mutated afterwards. Identifiers are
//! expected to be unique; when a table repeats one, the first row wins.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use tracing::warn;

use crate::feed::{Route, ShapePoint, Station, StopTime, Trip};

/// Identifier-keyed indexes over one feed.
#[derive(Debug, Default)]
pub struct FeedIndex {
    stations: Vec<Arc<Station>>,
    station_pos: HashMap<String, usize>,
    routes: HashMap<String, Route>,
    trips: Vec<Trip>,
    trip_pos: HashMap<String, usize>,
    stop_times: Vec<StopTime>,
    /// Positions into `stop_times`, ascending by stop sequence.
    by_trip: HashMap<String, Vec<usize>>,
    /// Positions into `stop_times`, in source order.
    by_station: HashMap<String, Vec<usize>>,
    /// Points ascending by sequence, one point per sequence number.
    shapes: HashMap<String, Vec<ShapePoint>>,
    /// Shape ids in order of first appearance.
    shape_order: Vec<String>,
}

impl FeedIndex {
    pub fn new(
        stations: Vec<Station>,
        shapes: Vec<ShapePoint>,
        trips: Vec<Trip>,
        stop_times: Vec<StopTime>,
        routes: Vec<Route>,
    ) -> Self {
        let mut index = FeedIndex::default();

        for station in stations {
            match index.station_pos.entry(station.id.clone()) {
                Entry::Occupied(_) => warn!(stop_id = %station.id, "duplicate stop id ignored"),
                Entry::Vacant(slot) => {
                    slot.insert(index.stations.len());
                    index.stations.push(Arc::new(station));
                }
            }
        }

        for route in routes {
            match index.routes.entry(route.id.clone()) {
                Entry::Occupied(_) => warn!(route_id = %route.id, "duplicate route id ignored"),
                Entry::Vacant(slot) => {
                    slot.insert(route);
                }
            }
        }

        for trip in trips {
            match index.trip_pos.entry(trip.id.clone()) {
                Entry::Occupied(_) => warn!(trip_id = %trip.id, "duplicate trip id ignored"),
                Entry::Vacant(slot) => {
                    slot.insert(index.trips.len());
                    index.trips.push(trip);
                }
            }
        }

        for (pos, stop_time) in stop_times.iter().enumerate() {
            index
                .by_trip
                .entry(stop_time.trip_id.clone())
                .or_default()
                .push(pos);
            index
                .by_station
                .entry(stop_time.stop_id.clone())
                .or_default()
                .push(pos);
        }
        for positions in index.by_trip.values_mut() {
            positions.sort_by_key(|&pos| stop_times[pos].sequence);
        }
        index.stop_times = stop_times;

        for point in shapes {
            match index.shapes.entry(point.shape_id.clone()) {
                Entry::Occupied(mut slot) => slot.get_mut().push(point),
                Entry::Vacant(slot) => {
                    index.shape_order.push(point.shape_id.clone());
                    slot.insert(vec![point]);
                }
            }
        }
        for points in index.shapes.values_mut() {
            points.sort_by_key(|p| p.sequence);
            points.dedup_by_key(|p| p.sequence);
        }

        index
    }

    /// Stations in source order.
    pub fn stations(&self) -> &[Arc<Station>] {
        &self.stations
    }

    pub fn station(&self, id: &str) -> Option<&Arc<Station>> {
        self.station_pos.get(id).map(|&pos| &self.stations[pos])
    }

    pub fn route(&self, id: &str) -> Option<&Route> {
        self.routes.get(id)
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Trips in source order.
    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn trip(&self, id: &str) -> Option<&Trip> {
        self.trip_pos.get(id).map(|&pos| &self.trips[pos])
    }

    /// Every stop time in source order.
    pub fn stop_times(&self) -> &[StopTime] {
        &self.stop_times
    }

    /// A trip's stop times, ascending by stop sequence.
    pub fn trip_stop_times<'a>(&'a self, trip_id: &str) -> impl Iterator<Item = &'a StopTime> {
        self.by_trip
            .get(trip_id)
            .into_iter()
            .flatten()
            .map(|&pos| &self.stop_times[pos])
    }

    /// Stop times calling at a station, in source order.
    pub fn station_stop_times<'a>(
        &'a self,
        stop_id: &str,
    ) -> impl Iterator<Item = &'a StopTime> {
        self.by_station
            .get(stop_id)
            .into_iter()
            .flatten()
            .map(|&pos| &self.stop_times[pos])
    }

    /// A shape's points in traversal order; empty for unknown shapes.
    pub fn shape(&self, shape_id: &str) -> &[ShapePoint] {
        self.shapes.get(shape_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every shape in order of first appearance.
    pub fn shapes(&self) -> impl Iterator<Item = (&str, &[ShapePoint])> {
        self.shape_order
            .iter()
            .map(|id| (id.as_str(), self.shape(id)))
    }
}
