//! The derived network model.
//!
//! [`FeedIndex`] holds the identifier lookups, [`derive_paths`] turns them
//! into rail [`PathSummary`] values, and [`Network`] bundles both into the
//! immutable snapshot that readers query.

mod index;
mod paths;
mod snapshot;

pub use index::FeedIndex;
pub use paths::{DerivationReport, PathSummary, derive_paths};
pub use snapshot::{Departure, Diagnostics, Network};
