use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported URL scheme '{scheme}' (expected http or https)")]
    UnsupportedScheme { scheme: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid dataset name '{name}': {reason}")]
    InvalidDatasetName { name: String, reason: String },

    #[error("dataset '{name}' not found in search paths {searched:?}")]
    NotFound { name: String, searched: Vec<PathBuf> },
}

impl FetchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchError::Io {
            path: path.into(),
            source,
        }
    }
}
