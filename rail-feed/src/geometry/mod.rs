//! Renderable map features.
//!
//! Turns stations, derived paths and raw shapes into GeoJSON features
//! tagged with a rail/road [`Mode`].

mod features;
mod mode;

pub use features::{
    StationSize, collection, line_feature, path_feature, point_feature, shape_features,
};
pub use mode::{InvalidModePolicy, Mode, ModeClassifier, ModePolicy};
