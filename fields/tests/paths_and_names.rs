//! Path fields against stub collaborators, and capability names against a
//! changing registry.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use fieldwork_fetch::{DatasetResolver, Downloader, FetchError, PathResolvers};
use fieldwork_fields::{
    CapabilityName, CapabilityNameList, CapabilityRegistry, Existence, Field, FieldError,
    Implementation, PathConstraint, PathField, Setting, Value,
};
use url::Url;

struct FixtureDatasets {
    fixture: PathBuf,
    requested: Mutex<Vec<String>>,
}

impl DatasetResolver for FixtureDatasets {
    fn resolve(&self, name: &str) -> Result<PathBuf, FetchError> {
        self.requested.lock().unwrap().push(name.to_string());
        Ok(self.fixture.clone())
    }
}

struct NoNetwork;

impl Downloader for NoNetwork {
    fn fetch(&self, url: &Url) -> Result<PathBuf, FetchError> {
        Err(FetchError::Status {
            url: url.to_string(),
            status: 503,
        })
    }
}

fn resolvers(fixture: PathBuf) -> (PathResolvers, Arc<FixtureDatasets>) {
    let datasets = Arc::new(FixtureDatasets {
        fixture,
        requested: Mutex::default(),
    });
    (
        PathResolvers::new(Arc::new(NoNetwork), datasets.clone()),
        datasets,
    )
}

#[test]
fn existing_directory_allowed_when_files_are_not() {
    let dir = tempfile::tempdir().unwrap();
    let (resolvers, _) = resolvers(PathBuf::new());
    let field = PathField::with_resolvers(resolvers)
        .directory_ok(true)
        .file_ok(false);

    let resolved = field.validate(&Value::Path(dir.path().to_path_buf())).unwrap();

    assert!(resolved.is_absolute());
    assert_eq!(resolved, std::fs::canonicalize(dir.path()).unwrap());
}

#[test]
fn relative_paths_become_absolute() {
    let (resolvers, _) = resolvers(PathBuf::new());
    let field = PathField::with_resolvers(resolvers);

    let resolved = field
        .validate(&Value::Str("some/relative/output.h5".into()))
        .unwrap();

    assert!(resolved.is_absolute());
    assert!(resolved.ends_with("some/relative/output.h5"));
}

#[test]
fn required_path_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.fits");
    let (resolvers, _) = resolvers(PathBuf::new());
    let field = PathField::with_resolvers(resolvers).exists(Existence::Required);

    let err = field.validate(&Value::Path(missing)).unwrap_err();

    assert_eq!(err.constraint(), Some(PathConstraint::MustExist));
    assert!(err.to_string().ends_with("does not exist"));
}

#[test]
fn dataset_uri_returns_the_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = dir.path().join("optics.ecsv");
    std::fs::write(&fixture, b"# table").unwrap();
    let fixture = std::fs::canonicalize(fixture).unwrap();
    let (resolvers, datasets) = resolvers(fixture.clone());
    let field = PathField::with_resolvers(resolvers).exists(Existence::Required);

    let resolved = field
        .validate(&Value::Str("dataset://optics.ecsv".into()))
        .unwrap();

    assert_eq!(resolved, fixture);
    assert_eq!(*datasets.requested.lock().unwrap(), vec!["optics.ecsv"]);
}

#[test]
fn download_failure_is_a_resolve_error() {
    let (resolvers, _) = resolvers(PathBuf::new());
    let field = PathField::with_resolvers(resolvers);

    let err = field
        .validate(&Value::Str("https://example.org/missing.fits".into()))
        .unwrap_err();

    match err {
        FieldError::Resolve { uri, message } => {
            assert_eq!(uri, "https://example.org/missing.fits");
            assert!(message.contains("503"));
        }
        other => panic!("expected resolve error, got {other:?}"),
    }
}

#[test]
fn path_setting_can_be_unset() {
    let (resolvers, _) = resolvers(PathBuf::new());
    let mut setting = Setting::new(
        "output_path",
        PathField::with_resolvers(resolvers).allow_none(true),
    );

    setting.set_from_str("None").unwrap();
    assert_eq!(setting.value(), None);

    assert!(setting.set_from_str("").is_err());
}

#[test]
fn capability_name_tracks_registrations() {
    let registry = Arc::new(CapabilityRegistry::new());
    registry.declare("ImageCleaner");
    let field = CapabilityName::with_registry("ImageCleaner", Arc::clone(&registry));
    let raw = Value::Str("TailcutsImageCleaner".into());

    assert!(field.validate(&raw).unwrap_err().is_validation());
    assert_eq!(field.info(), "any of []");

    registry.register(
        "ImageCleaner",
        Implementation::new("TailcutsImageCleaner").with_description("Two-threshold cleaning"),
    );

    assert_eq!(field.validate(&raw).unwrap(), "TailcutsImageCleaner");
    assert_eq!(field.info(), "any of [\"TailcutsImageCleaner\"]");
}

#[test]
fn capability_name_list_setting() {
    let registry = Arc::new(CapabilityRegistry::new());
    for name in ["HillasReconstructor", "ImPACTReconstructor"] {
        registry.register("Reconstructor", Implementation::new(name));
    }
    let mut setting = Setting::new(
        "reconstructors",
        CapabilityNameList::with_registry("Reconstructor", Arc::clone(&registry)),
    );

    setting
        .set_from_str("ImPACTReconstructor,HillasReconstructor")
        .unwrap();
    assert_eq!(
        setting.value(),
        Some(&vec![
            "ImPACTReconstructor".to_string(),
            "HillasReconstructor".to_string()
        ])
    );

    let err = setting.set_from_str("HillasReconstructor,Nope").unwrap_err();
    assert!(err.to_string().starts_with("reconstructors: element 1:"));
}

#[test]
fn unregistered_default_fails_at_construction() {
    let registry = Arc::new(CapabilityRegistry::new());
    registry.register("ImageCleaner", Implementation::new("TailcutsImageCleaner"));

    let err = Setting::with_default(
        "cleaner",
        CapabilityName::with_registry("ImageCleaner", Arc::clone(&registry)),
        "FACTImageCleaner",
    )
    .unwrap_err();

    assert!(err.to_string().starts_with("cleaner: 'FACTImageCleaner' is not a known ImageCleaner"));
}
