use std::path::{Path, PathBuf};

use fieldwork_types::FieldError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A well-formed entry with an unusable value.
    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },

    /// A component value the setting rejected. Validation messages already
    /// start with the setting name.
    #[error("[components.{component}] {source}")]
    Field {
        component: String,
        setting: String,
        #[source]
        source: FieldError,
    },
}

impl ConfigError {
    /// File the error came from, for read and parse failures.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Some(path),
            ConfigError::Invalid { .. } | ConfigError::Field { .. } => None,
        }
    }
}
