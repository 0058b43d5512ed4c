//! Feed configuration.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::geometry::{InvalidModePolicy, ModePolicy};

/// Where the feed tables are retrieved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedLocation {
    /// A directory holding `<table>.txt` files.
    Directory(PathBuf),
    /// A base URL; each table is fetched from `<base_url>/<table>`.
    Http { base_url: String },
}

impl Default for FeedLocation {
    fn default() -> Self {
        FeedLocation::Directory(PathBuf::from("feed"))
    }
}

/// Configuration for loading and deriving a feed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub location: FeedLocation,
    /// Maximum table retrievals in flight at once
    pub max_concurrent: usize,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
    /// How routes and shapes are classified as rail or road
    pub mode_policy: ModePolicy,
    /// Reload period for long-running processes; `None` loads once
    pub refresh_interval: Option<Duration>,
    /// Station ids drawn as major markers
    pub major_stations: HashSet<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            location: FeedLocation::default(),
            max_concurrent: 6,
            timeout_secs: 30,
            mode_policy: ModePolicy::default(),
            refresh_interval: None,
            major_stations: HashSet::new(),
        }
    }
}

/// Invalid configuration value in the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("FEED_MODE_POLICY: {0}")]
    ModePolicy(#[from] InvalidModePolicy),

    #[error("FEED_DIR and FEED_URL are mutually exclusive")]
    ConflictingLocation,
}

impl FeedConfig {
    pub fn new(location: FeedLocation) -> Self {
        Self {
            location,
            ..Self::default()
        }
    }

    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max.max(1);
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_mode_policy(mut self, policy: ModePolicy) -> Self {
        self.mode_policy = policy;
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    pub fn with_major_stations<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.major_stations = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Build a config from `FEED_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let location = match (get("FEED_DIR"), get("FEED_URL")) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingLocation),
            (Some(dir), None) => FeedLocation::Directory(PathBuf::from(dir)),
            (None, Some(url)) => FeedLocation::Http {
                base_url: url.trim_end_matches('/').to_string(),
            },
            (None, None) => FeedLocation::default(),
        };
        let mut config = FeedConfig::new(location);

        if let Some(value) = get("FEED_MAX_CONCURRENT") {
            config = config.with_max_concurrent(positive("FEED_MAX_CONCURRENT", &value)? as usize);
        }
        if let Some(value) = get("FEED_TIMEOUT_SECS") {
            config = config.with_timeout_secs(positive("FEED_TIMEOUT_SECS", &value)?);
        }
        if let Some(value) = get("FEED_MODE_POLICY") {
            config = config.with_mode_policy(value.parse()?);
        }
        if let Some(value) = get("FEED_REFRESH_SECS") {
            let secs = positive("FEED_REFRESH_SECS", &value)?;
            config = config.with_refresh_interval(Duration::from_secs(secs));
        }
        if let Some(value) = get("FEED_MAJOR_STATIONS") {
            config = config.with_major_stations(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty()),
            );
        }

        Ok(config)
    }
}

fn positive(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            var,
            value: value.to_string(),
        }),
    }
}
