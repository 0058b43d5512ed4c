//! Rail/road classification.
//!
//! Feeds are inconsistent about how they mark rail service. The `route_type`
//! column is authoritative when it is filled in. Some operators instead
//! encode the mode in their identifiers, with rail keys starting with the
//! digit `1`. That convention is a heuristic: nothing in the table schema
//! guarantees it, and it has been applied to route ids in some places and
//! shape ids in others. [`ModeClassifier`] makes the choice explicit.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::feed::{ROAD_ROUTE_TYPE, Route};

/// Transport mode of a route or shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Mode {
    /// Regional rail
    #[serde(rename = "REG")]
    Rail,
    /// Bus and other road service
    #[serde(rename = "BUS")]
    Road,
}

impl Mode {
    /// Identifier-prefix heuristic: keys starting with `1` are rail.
    pub fn from_identifier(key: &str) -> Self {
        if key.starts_with('1') {
            Mode::Rail
        } else {
            Mode::Road
        }
    }

    /// Classification from a `route_type` mode code.
    pub fn from_route_type(code: u16) -> Self {
        if code == ROAD_ROUTE_TYPE {
            Mode::Road
        } else {
            Mode::Rail
        }
    }

    /// Short tag used in map features.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Rail => "REG",
            Mode::Road => "BUS",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which signal decides the mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModePolicy {
    /// Use the route's `route_type`; fall back to the shape-id prefix when
    /// the route or its code is missing.
    #[default]
    RouteType,
    /// Route identifier starts with `1` ⇒ rail.
    RouteIdPrefix,
    /// Shape identifier starts with `1` ⇒ rail.
    ShapeIdPrefix,
}

/// Error returned when parsing an unknown policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode policy {0:?} (expected route-type, route-prefix or shape-prefix)")]
pub struct InvalidModePolicy(String);

impl FromStr for ModePolicy {
    type Err = InvalidModePolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "route-type" | "route_type" => Ok(ModePolicy::RouteType),
            "route-prefix" | "route_prefix" => Ok(ModePolicy::RouteIdPrefix),
            "shape-prefix" | "shape_prefix" => Ok(ModePolicy::ShapeIdPrefix),
            _ => Err(InvalidModePolicy(s.to_string())),
        }
    }
}

/// The single classification function used for filtering and tagging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeClassifier {
    policy: ModePolicy,
}

impl ModeClassifier {
    pub fn new(policy: ModePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ModePolicy {
        self.policy
    }

    /// Classify a trip's service.
    ///
    /// `route` is the resolved route, if the trip's `route_id` resolved.
    pub fn classify(&self, route_id: &str, route: Option<&Route>, shape_id: &str) -> Mode {
        match self.policy {
            ModePolicy::RouteType => route
                .and_then(|r| r.route_type)
                .map(Mode::from_route_type)
                .unwrap_or_else(|| Mode::from_identifier(shape_id)),
            ModePolicy::RouteIdPrefix => Mode::from_identifier(route_id),
            ModePolicy::ShapeIdPrefix => Mode::from_identifier(shape_id),
        }
    }

    /// Classify a bare shape that has no trip context.
    ///
    /// Only the identifier heuristic is available here, so every policy
    /// reads the shape-id prefix.
    pub fn classify_shape(&self, shape_id: &str) -> Mode {
        Mode::from_identifier(shape_id)
    }
}
