//! Approximate spherical geometry.
//!
//! Good enough for labelling and map display. Points are `geo` points with
//! x = longitude and y = latitude, in decimal degrees.

use geo::Point;

use crate::feed::Station;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres (haversine formula).
pub fn distance_km(a: Point, b: Point) -> f64 {
    let (lat1, lat2) = (a.y().to_radians(), b.y().to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (b.x() - a.x()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// The station closest to `point`.
///
/// Closeness is plain Euclidean distance in degree space, not great-circle
/// distance. Ties go to the station that comes first in `stations`.
pub fn nearest_station<'a, I>(point: Point, stations: I) -> Option<&'a Station>
where
    I: IntoIterator<Item = &'a Station>,
{
    let mut best: Option<(&Station, f64)> = None;
    for station in stations {
        let dx = station.lon - point.x();
        let dy = station.lat - point.y();
        let d2 = dx * dx + dy * dy;
        match best {
            Some((_, best_d2)) if d2 >= best_d2 => {}
            _ => best = Some((station, d2)),
        }
    }
    best.map(|(station, _)| station)
}

/// Initial compass bearing from `from` to `to`, in `[0, 360)` degrees.
pub fn bearing_degrees(from: Point, to: Point) -> f64 {
    let (lat1, lat2) = (from.y().to_radians(), to.y().to_radians());
    let d_lon = (to.x() - from.x()).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    let bearing = y.atan2(x).to_degrees().rem_euclid(360.0);

    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if bearing >= 360.0 { 0.0 } else { bearing }
}
