//! Remote and symbolic resource resolution for path fields.
//!
//! Path fields accept `http(s)://` and `dataset://` references in addition to
//! plain filesystem paths. This crate provides the collaborators that turn
//! those references into local files:
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`cache`] | Blocking HTTP downloader with an on-disk cache |
//! | [`dataset`] | Named dataset lookup across search roots, optional remote fallback |
//! | [`settings`] | Concrete settings with defaults applied |
//!
//! Both collaborators sit behind traits ([`Downloader`], [`DatasetResolver`])
//! so fields can be exercised against stubs.
//!
//! Note that resolving an `http(s)` reference writes to the cache directory as
//! a side effect of what is otherwise validation.

use std::path::PathBuf;
use std::sync::Arc;

use url::Url;

pub mod cache;
pub mod dataset;
mod error;
pub mod settings;

pub use cache::CachingDownloader;
pub use dataset::DatasetRegistry;
pub use error::FetchError;
pub use settings::{CacheSettings, DATASET_PATH_ENV, DatasetSettings};

/// Fetches a remote resource and returns a local path to it.
///
/// Implementations must be idempotent: the same URL yields the same path, and
/// a repeated call should not need the network.
pub trait Downloader: Send + Sync {
    fn fetch(&self, url: &Url) -> Result<PathBuf, FetchError>;
}

/// Resolves a dataset name to an absolute local path.
pub trait DatasetResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<PathBuf, FetchError>;
}

/// The pair of collaborators a path field dispatches to.
#[derive(Clone)]
pub struct PathResolvers {
    pub downloader: Arc<dyn Downloader>,
    pub datasets: Arc<dyn DatasetResolver>,
}

impl std::fmt::Debug for PathResolvers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathResolvers").finish_non_exhaustive()
    }
}

impl PathResolvers {
    #[must_use]
    pub fn new(downloader: Arc<dyn Downloader>, datasets: Arc<dyn DatasetResolver>) -> Self {
        Self {
            downloader,
            datasets,
        }
    }

    /// Real collaborators: a caching downloader, and a dataset registry that
    /// shares it for its remote fallback.
    #[must_use]
    pub fn from_settings(cache: &CacheSettings, datasets: &DatasetSettings) -> Self {
        let downloader: Arc<dyn Downloader> = Arc::new(CachingDownloader::new(cache.clone()));
        let registry = DatasetRegistry::from_settings(datasets, Arc::clone(&downloader));
        Self {
            downloader,
            datasets: Arc::new(registry),
        }
    }
}

impl Default for PathResolvers {
    /// Default cache directory, dataset roots from the environment.
    fn default() -> Self {
        Self::from_settings(&CacheSettings::default(), &DatasetSettings::from_env())
    }
}
