//! File model to concrete fetch settings.

use std::path::PathBuf;
use std::time::Duration;

use fieldwork_fetch::settings::env_search_paths;
use fieldwork_fetch::{CacheSettings, DatasetSettings, PathResolvers};
use fieldwork_utils::expand_env_vars;
use url::Url;

use crate::{ConfigError, FieldworkConfig};

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(expand_env_vars(raw).into_owned())
}

impl FieldworkConfig {
    /// `[cache]` with defaults for anything unset or blank.
    #[must_use]
    pub fn cache_settings(&self) -> CacheSettings {
        let mut settings = CacheSettings::default();
        let Some(cache) = &self.cache else {
            return settings;
        };

        if let Some(dir) = cache.dir.as_deref().filter(|d| !d.trim().is_empty()) {
            settings.dir = expand_path(dir);
        }
        if let Some(secs) = cache.timeout_seconds.filter(|s| *s > 0) {
            settings.timeout = Duration::from_secs(secs);
        }
        if let Some(agent) = cache.user_agent.as_deref().filter(|a| !a.trim().is_empty()) {
            settings.user_agent = agent.to_string();
        }
        settings
    }

    /// Configured roots first, then those from the environment.
    pub fn dataset_settings(&self) -> Result<DatasetSettings, ConfigError> {
        let mut search_paths: Vec<PathBuf> = self
            .datasets
            .iter()
            .flat_map(|d| d.search_paths.iter())
            .filter(|p| !p.trim().is_empty())
            .map(|p| expand_path(p))
            .collect();
        search_paths.extend(env_search_paths());

        let remote_url = self
            .datasets
            .as_ref()
            .and_then(|d| d.remote_url.as_deref())
            .map(|raw| {
                let expanded = expand_env_vars(raw);
                Url::parse(&expanded).map_err(|e| ConfigError::Invalid {
                    key: "datasets.remote_url".to_string(),
                    message: format!("'{expanded}' is not a URL: {e}"),
                })
            })
            .transpose()?;

        Ok(DatasetSettings {
            search_paths,
            remote_url,
        })
    }

    /// Downloader and dataset registry built from this configuration.
    pub fn path_resolvers(&self) -> Result<PathResolvers, ConfigError> {
        Ok(PathResolvers::from_settings(
            &self.cache_settings(),
            &self.dataset_settings()?,
        ))
    }
}
