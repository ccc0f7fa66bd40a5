//! Concrete, defaults-applied settings for the fetch collaborators.
//!
//! The configuration file model is optional everywhere; these types are what
//! the downloader and dataset registry actually run with.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const DEFAULT_USER_AGENT: &str = "fieldwork-fetch/1.0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable listing dataset search roots (platform path separator).
pub const DATASET_PATH_ENV: &str = "FIELDWORK_DATASET_PATH";

#[must_use]
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("fieldwork")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub dir: PathBuf,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetSettings {
    /// Roots searched in order.
    pub search_paths: Vec<PathBuf>,
    /// Base URL datasets are downloaded from when no root has them.
    pub remote_url: Option<Url>,
}

impl DatasetSettings {
    /// Search roots taken from [`DATASET_PATH_ENV`] only.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            search_paths: env_search_paths(),
            remote_url: None,
        }
    }
}

#[must_use]
pub fn env_search_paths() -> Vec<PathBuf> {
    env::var_os(DATASET_PATH_ENV)
        .map(|raw| {
            env::split_paths(&raw)
                .filter(|p| !p.as_os_str().is_empty())
                .collect()
        })
        .unwrap_or_default()
}
