//! On-disk download cache.
//!
//! - Path layout: `{cache_dir}/{host[_port]}/[{query-<hash>}/]{url path}`
//! - The URL path is kept so cached files retain their names and extensions
//! - A query string contributes a SHA256-derived directory so two queries for
//!   the same path never collide
//! - A cache hit returns immediately; no network access
//! - Downloads stream into a temp file next to the target and are renamed into
//!   place, so a partial download is never mistaken for a hit

use std::path::PathBuf;

use fieldwork_utils::{FileSyncPolicy, persist_from_reader};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use url::Url;

use crate::Downloader;
use crate::error::FetchError;
use crate::settings::CacheSettings;

/// File name used when the URL path ends in `/`. Braces never appear
/// unescaped in a parsed URL path, so no real segment can produce this name.
const INDEX_FILE_NAME: &str = "{index}";

/// Hex characters of the query hash kept in the path.
const QUERY_KEY_LEN: usize = 16;

/// Blocking HTTP downloader backed by the on-disk cache.
#[derive(Debug, Clone)]
pub struct CachingDownloader {
    settings: CacheSettings,
}

impl CachingDownloader {
    #[must_use]
    pub fn new(settings: CacheSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn cache_dir(&self) -> &std::path::Path {
        &self.settings.dir
    }

    /// Where `url` is (or would be) cached. Pure; touches nothing on disk.
    pub fn cache_path(&self, url: &Url) -> Result<PathBuf, FetchError> {
        let host = url.host_str().ok_or_else(|| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: "URL has no host".to_string(),
        })?;

        let mut path = self.settings.dir.clone();
        path.push(match url.port() {
            Some(port) => format!("{host}_{port}"),
            None => host.to_string(),
        });

        if let Some(query) = url.query() {
            path.push(format!("{{query-{}}}", query_key(query)));
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|s| !s.is_empty() && *s != "." && *s != "..")
                    .collect()
            })
            .unwrap_or_default();
        let ends_with_slash = url.path().ends_with('/');

        for segment in &segments {
            path.push(segment);
        }
        if segments.is_empty() || ends_with_slash {
            path.push(INDEX_FILE_NAME);
        }

        Ok(path)
    }

    fn client(&self) -> Result<reqwest::blocking::Client, FetchError> {
        reqwest::blocking::Client::builder()
            .timeout(self.settings.timeout)
            .user_agent(self.settings.user_agent.clone())
            .build()
            .map_err(|source| FetchError::Request {
                url: String::new(),
                source,
            })
    }
}

impl Downloader for CachingDownloader {
    fn fetch(&self, url: &Url) -> Result<PathBuf, FetchError> {
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(FetchError::UnsupportedScheme {
                    scheme: other.to_string(),
                });
            }
        }

        let path = self.cache_path(url)?;
        if path.is_file() {
            debug!(url = %url, path = %path.display(), "Download cache hit");
            return Ok(path);
        }

        info!(url = %url, path = %path.display(), "Downloading");
        let client = self.client()?;
        let mut response = client
            .get(url.clone())
            .send()
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = persist_from_reader(&path, &mut response, FileSyncPolicy::SyncAll)
            .map_err(|e| FetchError::io(&path, e))?;
        debug!(url = %url, bytes, "Download complete");

        Ok(path)
    }
}

fn query_key(query: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.as_bytes());
    let digest = hasher.finalize();
    hex_encode(&digest)[..QUERY_KEY_LEN].to_string()
}

/// Hex encoding helper.
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
