//! Path field for input/output files, accepting local paths and URIs.
//!
//! Validation pipeline:
//!
//! 1. Absent input short-circuits when allowed (see [`Field::validate_optional`])
//! 2. Byte strings are decoded; anything not path-like is rejected
//! 3. `$VAR` / `${VAR}` references are expanded
//! 4. Empty strings are rejected
//! 5. Scheme dispatch: `http(s)` -> downloader, `dataset` -> dataset registry,
//!    none or `file` -> local path, anything else rejected
//! 6. The result is made absolute and canonical
//! 7. Existence and file/directory constraints are enforced
//!
//! Step 5 may download into the cache directory.

use std::path::{Path, PathBuf};

use fieldwork_fetch::{FetchError, PathResolvers};
use fieldwork_types::{FieldError, PathConstraint, Value};
use fieldwork_utils::{absolute_canonical, expand_env_vars};
use url::Url;

use crate::Field;

/// Existence requirement for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Existence {
    Required,
    Forbidden,
    #[default]
    Unconstrained,
}

#[derive(Debug, Clone)]
pub struct PathField {
    exists: Existence,
    directory_ok: bool,
    file_ok: bool,
    allow_none: bool,
    resolvers: PathResolvers,
}

impl Default for PathField {
    fn default() -> Self {
        Self::new()
    }
}

impl PathField {
    /// Unconstrained path field using the default download cache and the
    /// dataset roots from the environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_resolvers(PathResolvers::default())
    }

    #[must_use]
    pub fn with_resolvers(resolvers: PathResolvers) -> Self {
        Self {
            exists: Existence::Unconstrained,
            directory_ok: true,
            file_ok: true,
            allow_none: false,
            resolvers,
        }
    }

    pub fn exists(mut self, exists: Existence) -> Self {
        self.exists = exists;
        self
    }

    pub fn directory_ok(mut self, directory_ok: bool) -> Self {
        self.directory_ok = directory_ok;
        self
    }

    pub fn file_ok(mut self, file_ok: bool) -> Self {
        self.file_ok = file_ok;
        self
    }

    pub fn allow_none(mut self, allow_none: bool) -> Self {
        self.allow_none = allow_none;
        self
    }

    fn dispatch(&self, text: &str) -> Result<PathBuf, FieldError> {
        let url = match Url::parse(text) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => return Ok(PathBuf::from(text)),
            Err(e) => {
                return Err(FieldError::validation(format!(
                    "cannot parse \"{text}\" as a path or URI: {e}"
                )));
            }
        };

        match url.scheme() {
            "http" | "https" => self
                .resolvers
                .downloader
                .fetch(&url)
                .map_err(|e| resolve_error(text, &e)),
            "dataset" => {
                let name = text.split_once("dataset://").map_or("", |(_, name)| name);
                self.resolvers
                    .datasets
                    .resolve(name)
                    .map_err(|e| resolve_error(text, &e))
            }
            "file" => file_url_path(&url),
            // A Windows drive letter (`C:\data`) parses as a one-letter scheme.
            scheme if scheme.len() == 1 => Ok(PathBuf::from(text)),
            other => Err(FieldError::validation(format!(
                "unsupported URI scheme '{other}' in \"{text}\""
            ))),
        }
    }

    fn check_constraints(&self, path: PathBuf) -> Result<PathBuf, FieldError> {
        let exists = path.exists();
        match self.exists {
            Existence::Required if !exists => {
                return Err(FieldError::path_constraint(path, PathConstraint::MustExist));
            }
            Existence::Forbidden if exists => {
                return Err(FieldError::path_constraint(
                    path,
                    PathConstraint::MustNotExist,
                ));
            }
            _ => {}
        }

        if exists {
            if !self.directory_ok && path.is_dir() {
                return Err(FieldError::path_constraint(
                    path,
                    PathConstraint::NotDirectory,
                ));
            }
            if !self.file_ok && path.is_file() {
                return Err(FieldError::path_constraint(path, PathConstraint::NotFile));
            }
        }

        Ok(path)
    }
}

fn resolve_error(uri: &str, err: &FetchError) -> FieldError {
    FieldError::Resolve {
        uri: uri.to_string(),
        message: err.to_string(),
    }
}

/// `file:///abs` is a plain absolute path; `file://host/rest` is `host/rest`.
fn file_url_path(url: &Url) -> Result<PathBuf, FieldError> {
    if let Ok(path) = url.to_file_path() {
        return Ok(path);
    }
    let host = url.host_str().unwrap_or_default();
    let rest = Url::parse(&format!("file://{}", url.path()))
        .ok()
        .and_then(|local| local.to_file_path().ok())
        .ok_or_else(|| {
            FieldError::validation(format!("cannot convert \"{url}\" to a local path"))
        })?;
    let rest = rest.strip_prefix("/").unwrap_or(&rest);
    Ok(Path::new(host).join(rest))
}

impl Field for PathField {
    type Output = PathBuf;

    fn validate(&self, raw: &Value) -> Result<PathBuf, FieldError> {
        let local = match raw {
            Value::Path(path) => match path.to_str() {
                Some(text) => PathBuf::from(expand_env_vars(text).into_owned()),
                None => path.clone(),
            },
            Value::Str(_) | Value::Bytes(_) => {
                let text = raw
                    .to_text()
                    .ok_or_else(|| FieldError::invalid(self.info(), raw))?;
                let expanded = expand_env_vars(&text);
                if expanded.is_empty() {
                    return Err(FieldError::invalid(self.info(), raw));
                }
                self.dispatch(&expanded)?
            }
            _ => return Err(FieldError::invalid(self.info(), raw)),
        };

        let absolute = absolute_canonical(&local).map_err(|e| {
            FieldError::validation(format!(
                "cannot make path \"{}\" absolute: {e}",
                local.display()
            ))
        })?;
        self.check_constraints(absolute)
    }

    fn info(&self) -> String {
        let mut info = "a path or non-empty string for ".to_string();
        info += match self.exists {
            Existence::Required => "an existing",
            Existence::Forbidden => "a not existing",
            Existence::Unconstrained => "a",
        };

        if self.directory_ok && self.file_ok {
            info += " directory or file";
        } else {
            if self.file_ok {
                info += " file";
            }
            if self.directory_ok {
                info += " directory";
            }
        }
        if self.allow_none {
            info += " or None";
        }

        info
    }

    fn allow_none(&self) -> bool {
        self.allow_none
    }

    // Paths are never JSON; "123" is a file called 123.
    fn from_literal(&self, text: &str) -> Value {
        if text == "None" {
            Value::None
        } else {
            Value::Str(text.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldwork_fetch::{DatasetResolver, Downloader};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct StubDownloader {
        calls: Mutex<Vec<String>>,
        target: PathBuf,
    }

    impl Downloader for StubDownloader {
        fn fetch(&self, url: &Url) -> Result<PathBuf, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            Ok(self.target.clone())
        }
    }

    struct StubDatasets(PathBuf);

    impl DatasetResolver for StubDatasets {
        fn resolve(&self, name: &str) -> Result<PathBuf, FetchError> {
            if name == "known.ecsv" {
                Ok(self.0.clone())
            } else {
                Err(FetchError::NotFound {
                    name: name.to_string(),
                    searched: Vec::new(),
                })
            }
        }
    }

    fn field_with(target: PathBuf) -> (PathField, Arc<StubDownloader>) {
        let downloader = Arc::new(StubDownloader {
            calls: Mutex::default(),
            target: target.clone(),
        });
        let resolvers = PathResolvers::new(downloader.clone(), Arc::new(StubDatasets(target)));
        (PathField::with_resolvers(resolvers), downloader)
    }

    #[test]
    fn http_urls_go_through_the_downloader() {
        let dir = tempfile::tempdir().unwrap();
        let cached = dir.path().join("cached.fits");
        std::fs::write(&cached, b"data").unwrap();
        let (field, downloader) = field_with(cached.clone());

        let resolved = field
            .validate(&Value::Str("https://example.org/cached.fits".into()))
            .unwrap();

        assert_eq!(resolved, std::fs::canonicalize(&cached).unwrap());
        assert_eq!(
            *downloader.calls.lock().unwrap(),
            vec!["https://example.org/cached.fits".to_string()]
        );
    }

    #[test]
    fn unknown_dataset_is_a_resolve_error() {
        let dir = tempfile::tempdir().unwrap();
        let (field, _) = field_with(dir.path().to_path_buf());

        let err = field
            .validate(&Value::Str("dataset://missing.h5".into()))
            .unwrap_err();

        assert!(matches!(err, FieldError::Resolve { ref uri, .. } if uri == "dataset://missing.h5"));
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        let (field, _) = field_with(PathBuf::from("/unused"));
        let err = field
            .validate(&Value::Str("s3://bucket/key".into()))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("s3"));
    }

    #[test]
    fn file_urls_and_plain_paths_agree() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("events.h5");
        std::fs::write(&file, b"").unwrap();
        let (field, _) = field_with(PathBuf::from("/unused"));

        let url = Url::from_file_path(&file).unwrap();
        let via_url = field.validate(&Value::Str(url.to_string())).unwrap();
        let via_path = field.validate(&Value::Path(file.clone())).unwrap();

        assert_eq!(via_url, via_path);
    }

    #[test]
    fn empty_and_non_path_input_is_rejected() {
        let (field, _) = field_with(PathBuf::from("/unused"));
        assert!(field.validate(&Value::Str(String::new())).is_err());
        assert!(field.validate(&Value::Int(3)).is_err());
        assert!(field.validate(&Value::None).is_err());
    }

    #[test]
    fn none_is_unset_when_allowed() {
        let (field, _) = field_with(PathBuf::from("/unused"));
        let field = field.allow_none(true);
        assert_eq!(field.validate_optional(&Value::None).unwrap(), None);
    }

    #[test]
    fn env_vars_expand_before_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let (field, _) = field_with(PathBuf::from("/unused"));
        unsafe {
            std::env::set_var("FIELDWORK_PATH_FIELD_TEST_DIR", dir.path());
        }

        let resolved = field
            .validate(&Value::Str("$FIELDWORK_PATH_FIELD_TEST_DIR/out.h5".into()))
            .unwrap();

        assert_eq!(
            resolved,
            std::fs::canonicalize(dir.path()).unwrap().join("out.h5")
        );
        unsafe {
            std::env::remove_var("FIELDWORK_PATH_FIELD_TEST_DIR");
        }
    }

    #[test]
    fn file_constraint_rejects_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, b"").unwrap();
        let (field, _) = field_with(PathBuf::from("/unused"));
        let field = field.file_ok(false);

        let err = field.validate(&Value::Path(file)).unwrap_err();

        assert_eq!(err.constraint(), Some(PathConstraint::NotFile));
    }

    #[test]
    fn forbidden_existence_rejects_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let (field, _) = field_with(PathBuf::from("/unused"));
        let field = field.exists(Existence::Forbidden);

        let err = field
            .validate(&Value::Path(dir.path().to_path_buf()))
            .unwrap_err();

        assert_eq!(err.constraint(), Some(PathConstraint::MustNotExist));
        assert!(err.to_string().contains("must not exist"));
    }

    #[test]
    fn info_describes_constraints() {
        let (field, _) = field_with(PathBuf::from("/unused"));
        assert_eq!(
            field.clone().info(),
            "a path or non-empty string for a directory or file"
        );
        let field = field
            .exists(Existence::Required)
            .directory_ok(false)
            .allow_none(true);
        assert_eq!(
            field.info(),
            "a path or non-empty string for an existing file or None"
        );
    }
}
