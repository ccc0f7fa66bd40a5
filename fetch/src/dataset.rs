//! Dataset lookup by name across configured search roots.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use fieldwork_utils::absolute_canonical;
use tracing::debug;
use url::Url;

use crate::error::FetchError;
use crate::settings::DatasetSettings;
use crate::{DatasetResolver, Downloader};

struct Remote {
    base: Url,
    downloader: Arc<dyn Downloader>,
}

/// Resolves `dataset://<name>` references.
///
/// Roots are searched in order and the first existing `root/name` wins. When
/// no root has the file and a remote is configured, `{remote}/{name}` is
/// fetched through the downloader instead. Names are relative paths that stay
/// below every root and below the remote base.
pub struct DatasetRegistry {
    search_paths: Vec<PathBuf>,
    remote: Option<Remote>,
}

impl fmt::Debug for DatasetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetRegistry")
            .field("search_paths", &self.search_paths)
            .field("remote", &self.remote.as_ref().map(|r| r.base.as_str()))
            .finish()
    }
}

impl DatasetRegistry {
    #[must_use]
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            remote: None,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &DatasetSettings, downloader: Arc<dyn Downloader>) -> Self {
        let registry = Self::new(settings.search_paths.clone());
        match &settings.remote_url {
            Some(base) => registry.with_remote(base.clone(), downloader),
            None => registry,
        }
    }

    #[must_use]
    pub fn with_remote(mut self, mut base: Url, downloader: Arc<dyn Downloader>) -> Self {
        // Url::join replaces the last segment unless the base ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        self.remote = Some(Remote { base, downloader });
        self
    }

    #[must_use]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

/// Reject names that would leave a search root: absolute paths, drive
/// prefixes and `..` components.
fn check_name(name: &str) -> Result<(), FetchError> {
    let invalid = |reason: &str| FetchError::InvalidDatasetName {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    let path = Path::new(name);
    if path.has_root() || path.is_absolute() || name.starts_with(['/', '\\']) {
        return Err(invalid("must be a relative path"));
    }
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => return Err(invalid("must not contain '..'")),
            Component::RootDir | Component::Prefix(_) => return Err(invalid("must be a relative path")),
        }
    }
    if name.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(invalid("must not contain '..'"));
    }
    Ok(())
}

impl DatasetResolver for DatasetRegistry {
    fn resolve(&self, name: &str) -> Result<PathBuf, FetchError> {
        let not_found = || FetchError::NotFound {
            name: name.to_string(),
            searched: self.search_paths.clone(),
        };
        if name.trim().is_empty() {
            return Err(not_found());
        }
        check_name(name)?;

        for root in &self.search_paths {
            let candidate = root.join(name);
            if candidate.exists() {
                debug!(dataset = name, path = %candidate.display(), "Dataset found locally");
                return absolute_canonical(&candidate).map_err(|e| FetchError::io(&candidate, e));
            }
        }

        if let Some(remote) = &self.remote {
            let url = remote
                .base
                .join(name)
                .map_err(|e| FetchError::InvalidUrl {
                    url: format!("{}{name}", remote.base),
                    reason: e.to_string(),
                })?;
            if !url.as_str().starts_with(remote.base.as_str()) {
                return Err(FetchError::InvalidDatasetName {
                    name: name.to_string(),
                    reason: format!("resolves outside {}", remote.base),
                });
            }
            debug!(dataset = name, url = %url, "Dataset not found locally, fetching");
            return remote.downloader.fetch(&url);
        }

        Err(not_found())
    }
}
