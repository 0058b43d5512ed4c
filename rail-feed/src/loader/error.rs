//! Feed loading error types.

use crate::feed::FeedTable;

/// Errors retrieving one table's raw text.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Reading a local file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Table is not present in the source
    #[error("table not available")]
    Missing,
}

/// Errors that abort a whole load cycle.
///
/// No partial network is ever built when one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A required table could not be retrieved
    #[error("failed to retrieve {table}: {source}")]
    Source {
        table: FeedTable,
        #[source]
        source: SourceError,
    },

    /// The load was cancelled before completion
    #[error("load cancelled")]
    Cancelled,

    /// The build task panicked or was aborted
    #[error("network build task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
