//! Configuration file for Fieldwork.
//!
//! A single TOML file, located at `$FIELDWORK_CONFIG` or
//! `{config_dir}/fieldwork/config.toml`:
//!
//! ```toml
//! [cache]
//! dir = "${SCRATCH}/fieldwork-cache"
//! timeout_seconds = 60
//!
//! [datasets]
//! search_paths = ["/data/resources", "$HOME/datasets"]
//! remote_url = "https://example.org/resources/"
//!
//! [components.ImageCleaner]
//! picture_threshold = [["type", "*", 10.0], ["type", "LST_*", 8.0]]
//! ```
//!
//! Every section is optional. The file model is converted into concrete
//! fetch settings with defaults applied (see [`FieldworkConfig::cache_settings`])
//! and component sections feed raw values into [`Setting`](fieldwork_fields::Setting)s
//! (see [`ComponentConfig::apply`]).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

mod component;
mod error;
mod resolved;

pub use component::ComponentConfig;
pub use error::ConfigError;

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "FIELDWORK_CONFIG";

#[derive(Debug, Default, Deserialize)]
pub struct FieldworkConfig {
    pub cache: Option<CacheConfig>,
    pub datasets: Option<DatasetsConfig>,
    /// Raw parameter values per component name.
    #[serde(default)]
    pub components: BTreeMap<String, toml::Table>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CacheConfig {
    /// Download cache directory. Environment variables are expanded.
    pub dir: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DatasetsConfig {
    /// Roots searched before those in `FIELDWORK_DATASET_PATH`.
    #[serde(default)]
    pub search_paths: Vec<String>,
    pub remote_url: Option<String>,
}

impl FieldworkConfig {
    /// Load from the default location. A missing file is `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            tracing::warn!(path = %path.display(), error = %source, "Failed to read config");
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        Self::from_toml_str(&content).map_err(|source| {
            tracing::warn!(path = %path.display(), error = %source, "Failed to parse config");
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("fieldwork").join("config.toml"))
}
