//! The currently published network.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use super::error::LoadError;
use super::source::FeedSource;
use super::{CancelToken, FeedLoader};
use crate::network::Network;

/// Handle to the latest successfully loaded [`Network`].
///
/// Readers take an `Arc` snapshot and keep using it for as long as they
/// like; a reload swaps in a new network without touching the old one.
#[derive(Debug, Clone)]
pub struct SharedNetwork {
    inner: Arc<RwLock<Arc<Network>>>,
}

impl SharedNetwork {
    pub fn new(network: Network) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(network))),
        }
    }

    /// The network current at the time of the call.
    pub async fn snapshot(&self) -> Arc<Network> {
        Arc::clone(&*self.inner.read().await)
    }

    /// Publish `network`, returning the one it replaced.
    pub async fn replace(&self, network: Network) -> Arc<Network> {
        self.publish(Arc::new(network)).await
    }

    async fn publish(&self, network: Arc<Network>) -> Arc<Network> {
        let mut guard = self.inner.write().await;
        std::mem::replace(&mut *guard, network)
    }

    /// Load a fresh network and publish it.
    ///
    /// On failure the current network stays published and the error is
    /// returned.
    pub async fn reload<S: FeedSource>(
        &self,
        loader: &FeedLoader<S>,
        cancel: &CancelToken,
    ) -> Result<Arc<Network>, LoadError> {
        match loader.load(cancel).await {
            Ok(network) => {
                let network = Arc::new(network);
                self.publish(Arc::clone(&network)).await;
                info!(paths = network.path_summaries().len(), "published reloaded network");
                Ok(network)
            }
            Err(err) => {
                warn!(error = %err, "reload failed, keeping current network");
                Err(err)
            }
        }
    }
}
