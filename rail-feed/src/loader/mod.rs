//! Feed loading.
//!
//! The only I/O boundary of the crate. [`FeedLoader`] fetches every table
//! concurrently, then parses, normalizes and derives the [`Network`] in one
//! blocking step. A load either produces a complete network or fails; it
//! never hands out a partial one.

mod cancel;
mod error;
mod shared;
mod source;

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::FeedConfig;
use crate::feed::{Feed, FeedTable};
use crate::network::Network;

pub use cancel::CancelToken;
pub use error::{LoadError, SourceError};
pub use shared::SharedNetwork;
pub use source::{ConfiguredSource, DirectorySource, FeedSource, HttpSource, MemorySource};

/// Loads feeds from a [`FeedSource`].
#[derive(Debug)]
pub struct FeedLoader<S> {
    source: S,
    config: FeedConfig,
    semaphore: Arc<Semaphore>,
}

impl FeedLoader<ConfiguredSource> {
    /// A loader for the location named in `config`.
    pub fn from_config(config: FeedConfig) -> Result<Self, SourceError> {
        let source = ConfiguredSource::from_config(&config)?;
        Ok(Self::new(source, config))
    }
}

impl<S: FeedSource> FeedLoader<S> {
    pub fn new(source: S, config: FeedConfig) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent.max(1)));
        Self {
            source,
            config,
            semaphore,
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Retrieve every table and build a network.
    ///
    /// Fails if a required table cannot be retrieved or `cancel` fires
    /// before the build starts. An optional table that fails to load is
    /// treated as empty.
    pub async fn load(&self, cancel: &CancelToken) -> Result<Network, LoadError> {
        info!("loading feed");

        let fetches = FeedTable::ALL.map(|table| self.fetch(table, cancel));
        let texts = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LoadError::Cancelled),
            texts = try_join_all(fetches) => texts?,
        };
        let texts: HashMap<FeedTable, String> = texts.into_iter().collect();

        if cancel.is_cancelled() {
            return Err(LoadError::Cancelled);
        }

        let config = self.config.clone();
        let network = tokio::task::spawn_blocking(move || {
            let feed = Feed::from_texts(&texts);
            Network::build(feed, &config)
        })
        .await?;

        info!(
            stations = network.stations().len(),
            paths = network.path_summaries().len(),
            skipped_rows = network
                .diagnostics()
                .tables
                .iter()
                .map(|r| r.skipped)
                .sum::<usize>(),
            "feed loaded"
        );

        Ok(network)
    }

    async fn fetch(
        &self,
        table: FeedTable,
        cancel: &CancelToken,
    ) -> Result<(FeedTable, String), LoadError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| LoadError::Cancelled)?;

        if cancel.is_cancelled() {
            return Err(LoadError::Cancelled);
        }

        match self.source.fetch(table).await {
            Ok(text) => {
                debug!(%table, bytes = text.len(), "retrieved table");
                Ok((table, text))
            }
            Err(err) if !table.is_required() => {
                warn!(%table, error = %err, "optional table unavailable, using empty table");
                Ok((table, String::new()))
            }
            Err(source) => Err(LoadError::Source { table, source }),
        }
    }
}
