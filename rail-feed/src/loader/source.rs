//! Raw table retrieval.
//!
//! A [`FeedSource`] knows how to get the text of one table and nothing
//! else. Parsing happens after every table has arrived.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use super::error::SourceError;
use crate::config::{FeedConfig, FeedLocation};
use crate::feed::FeedTable;

/// Retrieves the raw text of feed tables.
///
/// Implementations must be safe to call concurrently for different tables.
pub trait FeedSource: Send + Sync {
    fn fetch(&self, table: FeedTable) -> impl Future<Output = Result<String, SourceError>> + Send;
}

/// Reads `<dir>/<table>.txt`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FeedSource for DirectorySource {
    async fn fetch(&self, table: FeedTable) -> Result<String, SourceError> {
        let path = self.dir.join(table.file_name());
        debug!(path = %path.display(), "reading table");
        Ok(tokio::fs::read_to_string(&path).await?)
    }
}

/// Fetches `<base_url>/<table>` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, table: FeedTable) -> String {
        format!("{}/{}", self.base_url, table.name())
    }
}

impl FeedSource for HttpSource {
    async fn fetch(&self, table: FeedTable) -> Result<String, SourceError> {
        let url = self.url(table);
        debug!(%url, "fetching table");

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url,
            });
        }

        Ok(response.text().await?)
    }
}

/// Tables held in memory, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<FeedTable, String>,
    delay: Option<Duration>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: FeedTable, text: impl Into<String>) -> Self {
        self.tables.insert(table, text.into());
        self
    }

    /// Wait this long before answering each fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl FeedSource for MemorySource {
    async fn fetch(&self, table: FeedTable) -> Result<String, SourceError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.tables.get(&table).cloned().ok_or(SourceError::Missing)
    }
}

/// The source selected by a [`FeedConfig`].
#[derive(Debug, Clone)]
pub enum ConfiguredSource {
    Directory(DirectorySource),
    Http(HttpSource),
}

impl ConfiguredSource {
    pub fn from_config(config: &FeedConfig) -> Result<Self, SourceError> {
        Ok(match &config.location {
            FeedLocation::Directory(dir) => {
                ConfiguredSource::Directory(DirectorySource::new(dir.clone()))
            }
            FeedLocation::Http { base_url } => {
                ConfiguredSource::Http(HttpSource::new(base_url.clone(), config.timeout_secs)?)
            }
        })
    }
}

impl FeedSource for ConfiguredSource {
    async fn fetch(&self, table: FeedTable) -> Result<String, SourceError> {
        match self {
            ConfiguredSource::Directory(source) => source.fetch(table).await,
            ConfiguredSource::Http(source) => source.fetch(table).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn directory_reads_table_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("stops.txt"), "stop_id\nA\n").unwrap();

        let source = DirectorySource::new(dir.path());
        assert_eq!(source.fetch(FeedTable::Stops).await.unwrap(), "stop_id\nA\n");
        assert!(matches!(
            source.fetch(FeedTable::Routes).await,
            Err(SourceError::Io(_))
        ));
    }

    #[test]
    fn http_urls_use_table_names() {
        let source = HttpSource::new("http://localhost:8080/feed/", 5).unwrap();
        assert_eq!(source.url(FeedTable::StopTimes), "http://localhost:8080/feed/stop_times");
    }

    #[tokio::test]
    async fn memory_source_reports_missing_tables() {
        let source = MemorySource::new().with_table(FeedTable::Trips, "trip_id\n");
        assert_eq!(source.fetch(FeedTable::Trips).await.unwrap(), "trip_id\n");
        assert!(matches!(
            source.fetch(FeedTable::Shapes).await,
            Err(SourceError::Missing)
        ));
    }

    #[test]
    fn configured_source_follows_location() {
        let config = FeedConfig::new(FeedLocation::Http {
            base_url: "http://localhost:1".into(),
        });
        assert!(matches!(
            ConfiguredSource::from_config(&config).unwrap(),
            ConfiguredSource::Http(_)
        ));
        assert!(matches!(
            ConfiguredSource::from_config(&FeedConfig::default()).unwrap(),
            ConfiguredSource::Directory(_)
        ));
    }
}
