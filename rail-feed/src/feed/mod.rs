//! Typed feed tables.
//!
//! Converts raw table text into typed entities. Numeric faults and missing
//! required columns drop the row and are counted, so code downstream of
//! this module can trust every stored field.

mod error;
mod normalize;
mod types;

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

pub use error::RowError;
pub use normalize::{FromRecord, Table, TableReport, normalize};
pub use types::{
    Agency, CalendarDate, ROAD_ROUTE_TYPE, Route, ShapePoint, Station, StopTime, Trip,
};

/// The tables that make up a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedTable {
    Stops,
    Shapes,
    Trips,
    StopTimes,
    Routes,
    Agency,
    CalendarDates,
}

impl FeedTable {
    /// Every table, core tables first.
    pub const ALL: [FeedTable; 7] = [
        FeedTable::Stops,
        FeedTable::Shapes,
        FeedTable::Trips,
        FeedTable::StopTimes,
        FeedTable::Routes,
        FeedTable::Agency,
        FeedTable::CalendarDates,
    ];

    /// Table name without extension, as used in file names and URLs.
    pub fn name(self) -> &'static str {
        match self {
            FeedTable::Stops => "stops",
            FeedTable::Shapes => "shapes",
            FeedTable::Trips => "trips",
            FeedTable::StopTimes => "stop_times",
            FeedTable::Routes => "routes",
            FeedTable::Agency => "agency",
            FeedTable::CalendarDates => "calendar_dates",
        }
    }

    /// File name inside a feed directory.
    pub fn file_name(self) -> String {
        format!("{}.txt", self.name())
    }

    /// Whether a failed retrieval of this table fails the whole load.
    ///
    /// Agency and calendar tables only feed auxiliary views.
    pub fn is_required(self) -> bool {
        !matches!(self, FeedTable::Agency | FeedTable::CalendarDates)
    }
}

impl fmt::Display for FeedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// All tables of one feed, normalized.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    pub stations: Vec<Station>,
    pub shapes: Vec<ShapePoint>,
    pub trips: Vec<Trip>,
    pub stop_times: Vec<StopTime>,
    pub routes: Vec<Route>,
    pub agencies: Vec<Agency>,
    pub calendar_dates: Vec<CalendarDate>,
    /// One report per table, in [`FeedTable::ALL`] order.
    pub reports: Vec<TableReport>,
}

impl Feed {
    /// Normalize raw table texts. A table missing from `texts` is empty.
    pub fn from_texts(texts: &HashMap<FeedTable, String>) -> Self {
        let text = |table: FeedTable| texts.get(&table).map(String::as_str).unwrap_or("");

        let stations = normalize::<Station>(text(FeedTable::Stops));
        let shapes = normalize::<ShapePoint>(text(FeedTable::Shapes));
        let trips = normalize::<Trip>(text(FeedTable::Trips));
        let stop_times = normalize::<StopTime>(text(FeedTable::StopTimes));
        let routes = normalize::<Route>(text(FeedTable::Routes));
        let agencies = normalize::<Agency>(text(FeedTable::Agency));
        let calendar_dates = normalize::<CalendarDate>(text(FeedTable::CalendarDates));

        let reports = vec![
            stations.report,
            shapes.report,
            trips.report,
            stop_times.report,
            routes.report,
            agencies.report,
            calendar_dates.report,
        ];

        Self {
            stations: stations.rows,
            shapes: shapes.rows,
            trips: trips.rows,
            stop_times: stop_times.rows,
            routes: routes.rows,
            agencies: agencies.rows,
            calendar_dates: calendar_dates.rows,
            reports,
        }
    }

    /// Total rows dropped across all tables.
    pub fn skipped_rows(&self) -> usize {
        self.reports.iter().map(|r| r.skipped).sum()
    }
}
