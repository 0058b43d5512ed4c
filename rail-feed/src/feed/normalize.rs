//! Record → entity conversion.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, trace};

use super::FeedTable;
use super::error::RowError;
use super::types::{Agency, CalendarDate, Route, ShapePoint, Station, StopTime, Trip};
use crate::table::{self, Record};

/// Conversion from a parsed row into a typed entity.
pub trait FromRecord: Sized {
    /// The table this entity is read from.
    const TABLE: FeedTable;

    fn from_record(record: &Record) -> Result<Self, RowError>;
}

/// Row counts for one normalized table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub table: FeedTable,
    /// Rows kept as entities.
    pub rows: usize,
    /// Rows dropped because they failed to tokenize or normalize.
    pub skipped: usize,
}

/// A normalized table and its report.
#[derive(Debug, Clone)]
pub struct Table<T> {
    pub rows: Vec<T>,
    pub report: TableReport,
}

/// Parse and normalize one table, dropping rows that fail.
pub fn normalize<T: FromRecord>(text: &str) -> Table<T> {
    let mut parsed = table::parse(text);
    let mut rows = Vec::new();
    let mut skipped = 0;

    for record in parsed.by_ref() {
        match T::from_record(&record) {
            Ok(entity) => rows.push(entity),
            Err(err) => {
                trace!(table = %T::TABLE, error = %err, "dropping row");
                skipped += 1;
            }
        }
    }
    skipped += parsed.faults();

    let report = TableReport {
        table: T::TABLE,
        rows: rows.len(),
        skipped,
    };
    debug!(table = %T::TABLE, rows = report.rows, skipped, "normalized table");

    Table { rows, report }
}

fn required<'r>(record: &'r Record, field: &'static str) -> Result<&'r str, RowError> {
    record
        .get_opt(field)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(RowError::MissingField { field })
}

fn required_f64(record: &Record, field: &'static str) -> Result<f64, RowError> {
    let raw = required(record, field)?;
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RowError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

fn required_int<T: FromStr>(record: &Record, field: &'static str) -> Result<T, RowError> {
    let raw = required(record, field)?;
    raw.parse::<T>().map_err(|_| RowError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

/// Optional column: absent or unparseable reads as `None`.
fn optional<T: FromStr>(record: &Record, field: &str) -> Option<T> {
    record.get_opt(field).and_then(|v| v.trim().parse().ok())
}

fn text(record: &Record, field: &str) -> String {
    record.get(field).to_string()
}

impl FromRecord for Station {
    const TABLE: FeedTable = FeedTable::Stops;

    fn from_record(record: &Record) -> Result<Self, RowError> {
        Ok(Self {
            id: required(record, "stop_id")?.to_string(),
            code: text(record, "stop_code"),
            name: text(record, "stop_name"),
            description: text(record, "stop_desc"),
            zone_id: text(record, "zone_id"),
            lat: required_f64(record, "stop_lat")?,
            lon: required_f64(record, "stop_lon")?,
            location_type: text(record, "location_type"),
            parent_station: record.get_opt("parent_station").map(str::to_string),
            platform_code: text(record, "platform_code"),
        })
    }
}

impl FromRecord for ShapePoint {
    const TABLE: FeedTable = FeedTable::Shapes;

    fn from_record(record: &Record) -> Result<Self, RowError> {
        Ok(Self {
            shape_id: required(record, "shape_id")?.to_string(),
            lat: required_f64(record, "shape_pt_lat")?,
            lon: required_f64(record, "shape_pt_lon")?,
            sequence: required_int(record, "shape_pt_sequence")?,
            dist_traveled: optional::<f64>(record, "shape_dist_traveled")
                .filter(|d| d.is_finite()),
        })
    }
}

impl FromRecord for Trip {
    const TABLE: FeedTable = FeedTable::Trips;

    fn from_record(record: &Record) -> Result<Self, RowError> {
        Ok(Self {
            id: required(record, "trip_id")?.to_string(),
            route_id: required(record, "route_id")?.to_string(),
            service_id: text(record, "service_id"),
            shape_id: record.get("shape_id").trim().to_string(),
            headsign: text(record, "trip_headsign"),
            direction: optional(record, "direction_id"),
        })
    }
}

impl FromRecord for StopTime {
    const TABLE: FeedTable = FeedTable::StopTimes;

    fn from_record(record: &Record) -> Result<Self, RowError> {
        Ok(Self {
            trip_id: required(record, "trip_id")?.to_string(),
            stop_id: required(record, "stop_id")?.to_string(),
            sequence: required_int(record, "stop_sequence")?,
            arrival_time: text(record, "arrival_time"),
            departure_time: text(record, "departure_time"),
        })
    }
}

impl FromRecord for Route {
    const TABLE: FeedTable = FeedTable::Routes;

    fn from_record(record: &Record) -> Result<Self, RowError> {
        Ok(Self {
            id: required(record, "route_id")?.to_string(),
            agency_id: text(record, "agency_id"),
            short_name: text(record, "route_short_name"),
            long_name: text(record, "route_long_name"),
            color: text(record, "route_color"),
            text_color: text(record, "route_text_color"),
            route_type: optional(record, "route_type"),
        })
    }
}

impl FromRecord for Agency {
    const TABLE: FeedTable = FeedTable::Agency;

    fn from_record(record: &Record) -> Result<Self, RowError> {
        Ok(Self {
            id: text(record, "agency_id"),
            name: required(record, "agency_name")?.to_string(),
            url: text(record, "agency_url"),
            timezone: text(record, "agency_timezone"),
            lang: text(record, "agency_lang"),
        })
    }
}

impl FromRecord for CalendarDate {
    const TABLE: FeedTable = FeedTable::CalendarDates;

    fn from_record(record: &Record) -> Result<Self, RowError> {
        let raw_date = required(record, "date")?;
        let date =
            NaiveDate::parse_from_str(raw_date, "%Y%m%d").map_err(|_| RowError::InvalidDate {
                field: "date",
                value: raw_date.to_string(),
            })?;

        Ok(Self {
            service_id: required(record, "service_id")?.to_string(),
            date,
            exception_type: required_int(record, "exception_type")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STOPS: &str = "\
stop_id,stop_code,stop_name,stop_desc,stop_lat,stop_lon,zone_id,parent_station
830012891,CA,Cagliari,,39.2164,9.1082,Z1,
830012807,SS,Sassari,,40.7262,8.5620,Z2,830000000
BAD1,,Nowhere,,north,9.0,,
,,No id,,39.0,9.0,,
BAD2,,No lon,,39.0,,,
";

    #[test]
    fn stations_drop_bad_rows() {
        let table = normalize::<Station>(STOPS);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.report.table, FeedTable::Stops);
        assert_eq!(table.report.rows, 2);
        assert_eq!(table.report.skipped, 3);

        let cagliari = &table.rows[0];
        assert_eq!(cagliari.id, "830012891");
        assert_eq!(cagliari.code, "CA");
        assert_eq!(cagliari.zone_id, "Z1");
        assert_eq!(cagliari.parent_station, None);
        assert!((cagliari.lat - 39.2164).abs() < 1e-9);

        assert_eq!(table.rows[1].parent_station.as_deref(), Some("830000000"));
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let table = normalize::<Station>("stop_id,stop_lat,stop_lon\nA,NaN,9\nB,39,inf\n");
        assert!(table.rows.is_empty());
        assert_eq!(table.report.skipped, 2);
    }

    #[test]
    fn shape_points_require_sequence() {
        let text = "\
shape_id,shape_pt_lat,shape_pt_lon,shape_pt_sequence,shape_dist_traveled
1-X,39.0,9.0,1,0.0
1-X,39.5,9.5,2,
1-X,39.6,9.6,third,
";
        let table = normalize::<ShapePoint>(text);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.report.skipped, 1);
        assert_eq!(table.rows[0].dist_traveled, Some(0.0));
        assert_eq!(table.rows[1].dist_traveled, None);
        assert_eq!(table.rows[1].sequence, 2);
    }

    #[test]
    fn trips_keep_optional_fields() {
        let text = "\
route_id,service_id,trip_id,trip_headsign,direction_id,shape_id
R1,WK,T1,Sassari,0,1-X
R1,WK,T2,,,
,WK,T3,,,
";
        let table = normalize::<Trip>(text);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.report.skipped, 1);
        assert_eq!(table.rows[0].direction, Some(0));
        assert_eq!(table.rows[0].shape_id, "1-X");
        assert_eq!(table.rows[1].direction, None);
        assert_eq!(table.rows[1].shape_id, "");
    }

    #[test]
    fn stop_times_require_integer_sequence() {
        let text = "\
trip_id,arrival_time,departure_time,stop_id,stop_sequence
T1,08:00:00,08:01:00,A,1
T1,09:00:00,09:00:00,B,2.5
T1,10:00:00,10:00:00,C,
";
        let table = normalize::<StopTime>(text);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.report.skipped, 2);
        assert_eq!(table.rows[0].departure_time, "08:01:00");
    }

    #[test]
    fn route_type_is_optional() {
        let text = "\
route_id,agency_id,route_short_name,route_long_name,route_type,route_color
R1,TR,RV,Regionale Veloce,2,FF0000
R2,TR,,Bus,3,
R3,TR,,Unknown,tram,
";
        let table = normalize::<Route>(text);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0].route_type, Some(2));
        assert_eq!(table.rows[0].color, "FF0000");
        assert!(table.rows[1].is_road());
        assert_eq!(table.rows[2].route_type, None);
    }

    #[test]
    fn calendar_dates_parse_dates() {
        let text = "service_id,date,exception_type\nWK,20240315,1\nWK,2024-03-16,1\nWK,20240317,x\n";
        let table = normalize::<CalendarDate>(text);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.report.skipped, 2);
        assert_eq!(
            table.rows[0].date,
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
    }

    #[test]
    fn agencies_need_a_name() {
        let text = "agency_id,agency_name,agency_url,agency_timezone\nTR,Trenitalia,https://example.org,Europe/Rome\nX,,,\n";
        let table = normalize::<Agency>(text);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].timezone, "Europe/Rome");
    }

    #[test]
    fn empty_text_is_an_empty_table() {
        let table = normalize::<Route>("");
        assert!(table.rows.is_empty());
        assert_eq!(table.report.skipped, 0);
    }
}
