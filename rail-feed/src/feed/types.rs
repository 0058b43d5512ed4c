//! Typed feed entities.
//!
//! Every entity here has already passed normalization, so numeric fields
//! hold finite values and required identifiers are non-empty.

use chrono::NaiveDate;
use geo::Point;
use serde::Serialize;

/// `route_type` value marking road (bus) service.
pub const ROAD_ROUTE_TYPE: u16 = 3;

/// Boilerplate the operator puts in front of most stop names.
const STATION_NAME_PREFIX: &str = "Stazione di ";

/// A row of `stops.txt`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: String,
    pub zone_id: String,
    pub lat: f64,
    pub lon: f64,
    pub location_type: String,
    /// Identifier of the enclosing station, if any. Not resolved.
    pub parent_station: Option<String>,
    pub platform_code: String,
}

impl Station {
    /// Position as a `geo` point (x = longitude, y = latitude).
    pub fn location(&self) -> Point {
        Point::new(self.lon, self.lat)
    }

    /// Name for map labels, without the first `Stazione di ` occurrence.
    pub fn display_name(&self) -> String {
        self.name.replacen(STATION_NAME_PREFIX, "", 1)
    }
}

/// A row of `shapes.txt`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapePoint {
    pub shape_id: String,
    pub lat: f64,
    pub lon: f64,
    pub sequence: u32,
    pub dist_traveled: Option<f64>,
}

impl ShapePoint {
    pub fn location(&self) -> Point {
        Point::new(self.lon, self.lat)
    }
}

/// A row of `trips.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trip {
    pub id: String,
    pub route_id: String,
    pub service_id: String,
    /// Empty when the trip has no recorded geometry.
    pub shape_id: String,
    pub headsign: String,
    pub direction: Option<u8>,
}

/// A row of `stop_times.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopTime {
    pub trip_id: String,
    pub stop_id: String,
    pub sequence: u32,
    pub arrival_time: String,
    pub departure_time: String,
}

/// A row of `routes.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub id: String,
    pub agency_id: String,
    pub short_name: String,
    pub long_name: String,
    pub color: String,
    pub text_color: String,
    /// Mode code; `None` when the column is absent or unreadable.
    pub route_type: Option<u16>,
}

impl Route {
    /// Whether the mode code marks this as road service.
    pub fn is_road(&self) -> bool {
        self.route_type == Some(ROAD_ROUTE_TYPE)
    }

    /// Short name if present, otherwise the raw identifier.
    pub fn label(&self) -> &str {
        if self.short_name.is_empty() {
            &self.id
        } else {
            &self.short_name
        }
    }
}

/// A row of `agency.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agency {
    pub id: String,
    pub name: String,
    pub url: String,
    pub timezone: String,
    pub lang: String,
}

/// A row of `calendar_dates.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDate {
    pub service_id: String,
    pub date: NaiveDate,
    /// 1 = service added on `date`, 2 = service removed.
    pub exception_type: u8,
}
