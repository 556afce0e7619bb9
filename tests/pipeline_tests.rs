//! Packaging pipeline tests
//!
//! End-to-end runs over app directories built in temporary directories:
//! manifest loading, identifier checks, settings validation, build output
//! verification, archive contents and scratch-directory cleanup.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use fireberry_dev::{
    ErrorKind, PackConfig, PackSummary, Pipeline, PipelineError, PipelineState,
};
use tempfile::TempDir;

/// An app directory plus a private scratch root
struct App {
    dir: TempDir,
    scratch: TempDir,
}

impl App {
    fn new(manifest: &str) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("manifest.yml"), manifest).unwrap();
        Self {
            dir,
            scratch: TempDir::new().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, rel: &str, contents: &str) {
        let path = self.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn pipeline(&self) -> Pipeline {
        let config = PackConfig {
            scratch_root: Some(self.scratch.path().to_path_buf()),
            ..PackConfig::default()
        };
        Pipeline::new(self.path(), &config)
    }

    fn scratch_entries(&self) -> usize {
        fs::read_dir(self.scratch.path()).unwrap().count()
    }
}

fn manifest_with(components: &str) -> String {
    format!("app:\n  id: app-1\n  name: Demo\ncomponents:\n{}", components)
}

fn record(title: &str, id: &str, path: &str) -> String {
    format!(
        "  - type: record\n    title: {}\n    id: {}\n    path: {}\n    settings:\n      iconName: related-single\n      iconColor: \"#7aae7f\"\n      objectType: 1\n      height: M\n",
        title, id, path
    )
}

fn unpack(bytes: &[u8]) -> BTreeMap<String, String> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    let mut files = BTreeMap::new();
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        if entry.header().entry_type().is_file() {
            let path = entry.path().unwrap().to_string_lossy().to_string();
            let mut contents = String::new();
            entry.read_to_string(&mut contents).unwrap();
            files.insert(path, contents);
        }
    }
    files
}

fn expect_kind(result: Result<impl std::fmt::Debug, PipelineError>, kind: ErrorKind) -> PipelineError {
    let err = result.unwrap_err();
    assert_eq!(err.kind(), kind, "unexpected error: {}", err);
    err
}

// =============================================================================
// Successful runs
// =============================================================================

#[test]
fn test_zero_components_packages_nothing() {
    let app = App::new("app:\n  id: app-1\n  name: Demo\n");
    let mut pipeline = app.pipeline();

    let outcome = pipeline.run().unwrap();

    assert!(outcome.components.is_empty());
    assert_eq!(pipeline.state(), PipelineState::Done);
    assert_eq!(app.scratch_entries(), 0);

    let summary = PackSummary::success(outcome.manifest.app.id, &outcome.components, 0);
    assert_eq!(summary.render_human(), "No components to push");
}

#[test]
fn test_directory_build_round_trip() {
    let app = App::new(&manifest_with(&record("Orders", "o-1", "orders/dist")));
    app.write("orders/dist/a.txt", "alpha");
    app.write("orders/dist/b/c.txt", "gamma");

    let outcome = app.pipeline().run().unwrap();

    assert_eq!(outcome.components.len(), 1);
    let package = &outcome.components[0];
    assert_eq!(package.title, "Orders");
    assert_eq!(package.id, "o-1");

    let files = unpack(&package.build);
    assert_eq!(files.len(), 2);
    assert_eq!(files["a.txt"], "alpha");
    assert_eq!(files["b/c.txt"], "gamma");
}

#[test]
fn test_single_file_build() {
    let app = App::new(&manifest_with(&record("Orders", "o-1", "orders/bundle.js")));
    app.write("orders/bundle.js", "console.log(1)");

    let outcome = app.pipeline().run().unwrap();

    let files = unpack(&outcome.components[0].build);
    assert_eq!(files.len(), 1);
    assert_eq!(files["bundle.js"], "console.log(1)");
}

#[test]
fn test_components_keep_manifest_order() {
    let components = [
        record("Zeta", "z-1", "z/dist"),
        record("Alpha", "a-1", "a/dist"),
        record("Mid", "m-1", "m/dist"),
    ]
    .concat();
    let app = App::new(&manifest_with(&components));
    for dir in ["z", "a", "m"] {
        app.write(&format!("{}/dist/index.html", dir), dir);
    }

    let outcome = app.pipeline().run().unwrap();

    let ids: Vec<_> = outcome.components.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["z-1", "a-1", "m-1"]);
}

#[test]
fn test_repeated_runs_are_byte_identical() {
    let app = App::new(&manifest_with(&record("Orders", "o-1", "orders/dist")));
    app.write("orders/dist/a.txt", "alpha");

    let mut pipeline = app.pipeline();
    let first = pipeline.run().unwrap();
    let second = pipeline.run().unwrap();

    assert_eq!(first.components[0].build, second.components[0].build);
    assert_eq!(first.components[0].sha256, second.components[0].sha256);
}

#[test]
fn test_no_scratch_left_after_success() {
    let components = [record("A", "a-1", "a/dist"), record("B", "b-1", "b/dist")].concat();
    let app = App::new(&manifest_with(&components));
    app.write("a/dist/x.txt", "x");
    app.write("b/dist/y.txt", "y");

    app.pipeline().run().unwrap();

    assert_eq!(app.scratch_entries(), 0);
}

#[test]
fn test_check_does_not_package() {
    let app = App::new(&manifest_with(&record("Orders", "o-1", "orders/dist")));
    app.write("orders/dist/a.txt", "alpha");

    let mut pipeline = app.pipeline();
    let (_, verified) = pipeline.check().unwrap();

    assert_eq!(verified.len(), 1);
    assert_eq!(verified[0].component.id(), "o-1");
    assert!(!pipeline.history().contains(&PipelineState::Packaging));
    assert_eq!(app.scratch_entries(), 0);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_missing_manifest() {
    let app = App::new("");
    fs::remove_file(app.path().join("manifest.yml")).unwrap();
    let mut pipeline = app.pipeline();

    expect_kind(pipeline.run(), ErrorKind::ManifestNotFound);
    assert_eq!(pipeline.state(), PipelineState::Failed(ErrorKind::ManifestNotFound));
}

#[test]
fn test_malformed_manifest() {
    let app = App::new("app: [unterminated\n");
    expect_kind(app.pipeline().run(), ErrorKind::ManifestMalformed);
}

#[test]
fn test_manifest_without_app_id() {
    let app = App::new("app:\n  name: Demo\n");
    expect_kind(app.pipeline().run(), ErrorKind::ManifestIncomplete);
}

#[test]
fn test_duplicate_ids_fail_before_any_packaging() {
    let components = [record("A", "same", "a/dist"), record("B", "same", "b/dist")].concat();
    let app = App::new(&manifest_with(&components));
    app.write("a/dist/x.txt", "x");
    app.write("b/dist/y.txt", "y");
    let mut pipeline = app.pipeline();

    let err = expect_kind(pipeline.run(), ErrorKind::DuplicateComponentId);

    assert_eq!(err.exit_code(), 4);
    assert!(!pipeline.history().contains(&PipelineState::Verifying));
    assert_eq!(app.scratch_entries(), 0);
}

#[test]
fn test_duplicate_ids_reported_even_with_missing_paths() {
    let components = [record("A", "same", "a/dist"), record("B", "same", "b/dist")].concat();
    let app = App::new(&manifest_with(&components));

    expect_kind(app.pipeline().run(), ErrorKind::DuplicateComponentId);
}

#[test]
fn test_record_missing_object_type() {
    let component = "  - type: record\n    title: Orders\n    id: o-1\n    path: orders/dist\n    settings:\n      iconName: related-single\n      iconColor: \"#7aae7f\"\n      height: M\n";
    let app = App::new(&manifest_with(component));
    app.write("orders/dist/a.txt", "alpha");

    let err = expect_kind(app.pipeline().run(), ErrorKind::ComponentSettingsInvalid);

    let message = err.to_string();
    assert!(message.contains("Orders"), "{}", message);
    assert!(message.contains("objectType"), "{}", message);
    assert_eq!(app.scratch_entries(), 0);
}

#[test]
fn test_unsupported_type() {
    let component = "  - type: page\n    title: Orders\n    id: o-1\n    path: orders/dist\n    settings: {}\n";
    let app = App::new(&manifest_with(component));

    let err = expect_kind(app.pipeline().run(), ErrorKind::ComponentTypeUnsupported);
    assert!(err.to_string().contains("record, global-menu, side-menu"));
}

#[test]
fn test_missing_build_path() {
    let app = App::new(&manifest_with(&record("Orders", "o-1", "orders/dist")));

    let err = expect_kind(app.pipeline().run(), ErrorKind::ComponentPathMissing);

    assert_eq!(err.exit_code(), 5);
    assert!(err.to_string().contains("Orders"));
    assert_eq!(app.scratch_entries(), 0);
}

#[test]
fn test_empty_build_directory() {
    let app = App::new(&manifest_with(&record("Orders", "o-1", "orders/dist")));
    fs::create_dir_all(app.path().join("orders/dist")).unwrap();

    expect_kind(app.pipeline().run(), ErrorKind::ComponentBuildEmpty);
    assert_eq!(app.scratch_entries(), 0);
}

#[test]
fn test_fail_fast_discards_earlier_packages() {
    let components = [record("X", "x-1", "x/dist"), record("Y", "y-1", "y/missing")].concat();
    let app = App::new(&manifest_with(&components));
    app.write("x/dist/index.html", "x");
    let mut pipeline = app.pipeline();

    let err = expect_kind(pipeline.run(), ErrorKind::ComponentPathMissing);

    assert!(err.to_string().contains("\"Y\""), "{}", err);
    assert_eq!(pipeline.state(), PipelineState::Failed(ErrorKind::ComponentPathMissing));
    assert!(pipeline.history().contains(&PipelineState::Packaging));
    assert_eq!(app.scratch_entries(), 0);
}

#[test]
fn test_failure_summary_json() {
    let app = App::new(&manifest_with(&record("Orders", "o-1", "orders/dist")));
    let err = app.pipeline().run().unwrap_err();

    let summary = PackSummary::failure(&err, 0);
    let json = summary.to_json().unwrap();

    assert!(json.contains(r#""error_kind": "COMPONENT_PATH_MISSING""#));
    assert!(json.contains(r#""exit_code": 5"#));
}
