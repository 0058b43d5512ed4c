//! GeoJSON features for stations, paths and shapes.

use geo::Point;
use geojson::{Feature, FeatureCollection, Geometry, Value, feature::Id};
use serde_json::{Map, json};

use super::mode::{Mode, ModeClassifier};
use crate::feed::{ShapePoint, Station};
use crate::network::PathSummary;

/// Display weight of a station marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationSize {
    Major,
    Minor,
}

impl StationSize {
    pub fn as_str(self) -> &'static str {
        match self {
            StationSize::Major => "major",
            StationSize::Minor => "minor",
        }
    }
}

fn position(point: Point) -> Vec<f64> {
    vec![point.x(), point.y()]
}

/// Point feature for a station, labelled with its display name.
pub fn point_feature(station: &Station, size: StationSize) -> Feature {
    let mut properties = Map::new();
    properties.insert("id".to_string(), json!(station.id));
    properties.insert("name".to_string(), json!(station.display_name()));
    properties.insert("zone_id".to_string(), json!(station.zone_id));
    properties.insert("size".to_string(), json!(size.as_str()));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(position(station.location())))),
        id: Some(Id::String(station.id.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Line feature tagged with `mode`.
///
/// Returns `None` for fewer than two coordinates.
pub fn line_feature(id: &str, name: &str, mode: Mode, coords: &[Point]) -> Option<Feature> {
    if coords.len() < 2 {
        return None;
    }

    let mut properties = Map::new();
    properties.insert("id".to_string(), json!(id));
    properties.insert("name".to_string(), json!(name));
    properties.insert("type".to_string(), json!(mode.as_str()));

    let line = coords.iter().copied().map(position).collect();

    Some(Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::LineString(line))),
        id: Some(Id::String(id.to_string())),
        properties: Some(properties),
        foreign_members: None,
    })
}

/// Line feature for a derived path.
///
/// Uses the shape geometry when it has at least two points, otherwise the
/// coordinates of the visited stations.
pub fn path_feature(path: &PathSummary) -> Option<Feature> {
    let coords: Vec<Point> = if path.geometry.len() >= 2 {
        path.geometry.iter().map(ShapePoint::location).collect()
    } else {
        path.stations.iter().map(|s| s.location()).collect()
    };
    line_feature(&path.shape_id, &path.name, path.mode, &coords)
}

/// Line features for raw shapes, each named `Shape <id>`.
///
/// `points` must already be in traversal order.
pub fn shape_features<'a, I>(shapes: I, classifier: &ModeClassifier) -> Vec<Feature>
where
    I: IntoIterator<Item = (&'a str, &'a [ShapePoint])>,
{
    shapes
        .into_iter()
        .filter_map(|(shape_id, points)| {
            let coords: Vec<Point> = points.iter().map(ShapePoint::location).collect();
            line_feature(
                shape_id,
                &format!("Shape {shape_id}"),
                classifier.classify_shape(shape_id),
                &coords,
            )
        })
        .collect()
}

/// Wrap features in a collection.
pub fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
