//! Application state for the web layer.

use crate::loader::SharedNetwork;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The currently published network
    pub network: SharedNetwork,
}

impl AppState {
    pub fn new(network: SharedNetwork) -> Self {
        Self { network }
    }
}
