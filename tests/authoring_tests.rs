//! Manifest authoring, debug requests and registry hand-off
//!
//! Exercises the flows behind `component add`, `debug` and `pack --out`
//! through the library API.

use std::fs;

use fireberry_dev::component::ComponentType;
use fireberry_dev::config::EffectiveConfig;
use fireberry_dev::debug::{self, DebugError};
use fireberry_dev::manifest::{load_manifest, manifest_path, NewComponent};
use fireberry_dev::transport::PUSH_PAYLOAD_FILE;
use fireberry_dev::{
    validate_component, DirectoryRegistry, ErrorKind, ManifestError, PackConfig, Pipeline,
    PipelineError, Registry, SchemaRules,
};
use fireberry_protocol::PushRequest;
use tempfile::TempDir;

const BASE_MANIFEST: &str = "app:\n  id: app-1\n  name: Demo\n";

fn app_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("manifest.yml"), BASE_MANIFEST).unwrap();
    dir
}

#[test]
fn test_added_component_packages() {
    let dir = app_dir();

    let raw = NewComponent::new("orders", ComponentType::Record)
        .with_setting("objectType", 3u64)
        .into_raw();
    validate_component(&raw, &SchemaRules::default()).unwrap();

    let mut manifest = load_manifest(dir.path()).unwrap();
    manifest.add_component(raw.clone()).unwrap();
    manifest.save(&manifest_path(dir.path(), "manifest.yml")).unwrap();

    fs::create_dir_all(dir.path().join("orders/dist")).unwrap();
    fs::write(dir.path().join("orders/dist/index.html"), "<html/>").unwrap();

    let scratch = TempDir::new().unwrap();
    let config = PackConfig {
        scratch_root: Some(scratch.path().to_path_buf()),
        ..PackConfig::default()
    };
    let outcome = Pipeline::new(dir.path(), &config).run().unwrap();

    assert_eq!(outcome.components.len(), 1);
    assert_eq!(outcome.components[0].id, raw.id);
    assert_eq!(outcome.components[0].title, "orders");
}

#[test]
fn test_adding_same_title_twice_fails() {
    let dir = app_dir();
    let mut manifest = load_manifest(dir.path()).unwrap();

    manifest
        .add_component(NewComponent::new("menu", ComponentType::GlobalMenu).into_raw())
        .unwrap();
    let err = manifest
        .add_component(NewComponent::new("menu", ComponentType::GlobalMenu).into_raw())
        .unwrap_err();

    assert!(matches!(err, ManifestError::DuplicateComponentTitle { .. }));
    assert_eq!(PipelineError::from(err).kind(), ErrorKind::Authoring);
}

#[test]
fn test_height_outside_configured_options() {
    let raw = NewComponent::new("orders", ComponentType::Record)
        .with_setting("height", "XL")
        .into_raw();

    let err = validate_component(&raw, &SchemaRules::default()).unwrap_err();
    assert!(err.to_string().contains("must be one of: S | M | L"), "{}", err);

    let rules = SchemaRules::new(vec!["XL".to_string()], vec!["M".to_string()]);
    assert!(validate_component(&raw, &rules).is_ok());
}

#[test]
fn test_project_config_changes_allowed_sizes() {
    let dir = app_dir();
    fs::write(dir.path().join(".fireberry.toml"), "height_options = [\"S\", \"XL\"]\n").unwrap();

    let project = dir.path().join(".fireberry.toml");
    let effective = EffectiveConfig::build(None, Some(project.as_path()), None).unwrap();

    assert_eq!(effective.config.height_options, vec!["S", "XL"]);
    assert_eq!(effective.config.width_options, vec!["S", "M", "L"]);
    assert_eq!(effective.sources.len(), 2);
}

#[test]
fn test_debug_request_for_loaded_manifest() {
    let dir = app_dir();
    let mut manifest = load_manifest(dir.path()).unwrap();
    let raw = NewComponent::new("side", ComponentType::SideMenu).into_raw();
    let id = raw.id.clone();
    manifest.add_component(raw).unwrap();

    let request = debug::prepare(&manifest, &id, Some("localhost:3000"), false).unwrap();
    assert_eq!(request.component_id, id);
    assert!(request.is_start());

    let err = debug::prepare(&manifest, &id, Some("https://localhost:3000"), false).unwrap_err();
    assert!(matches!(err, DebugError::InvalidUrl { .. }));
    assert_eq!(PipelineError::from(err).exit_code(), 9);
}

#[test]
fn test_directory_registry_receives_pack_outcome() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("manifest.yml"),
        "app:\n  id: app-1\n  name: Demo\ncomponents:\n  - type: global-menu\n    title: Tools\n    id: t-1\n    path: tools/dist\n    settings:\n      displayName: Tools\n",
    )
    .unwrap();
    fs::create_dir_all(dir.path().join("tools/dist")).unwrap();
    fs::write(dir.path().join("tools/dist/main.js"), "export {}").unwrap();

    let scratch = TempDir::new().unwrap();
    let config = PackConfig {
        scratch_root: Some(scratch.path().to_path_buf()),
        ..PackConfig::default()
    };
    let outcome = Pipeline::new(dir.path(), &config).run().unwrap();

    let out = TempDir::new().unwrap();
    DirectoryRegistry::new(out.path())
        .push(&outcome.manifest, &outcome.components)
        .unwrap();

    let archive = fs::read(out.path().join("t-1.tar.gz")).unwrap();
    assert_eq!(archive, outcome.components[0].build);

    let request: PushRequest =
        serde_json::from_slice(&fs::read(out.path().join(PUSH_PAYLOAD_FILE)).unwrap()).unwrap();
    assert_eq!(request.components[0].sha256, outcome.components[0].sha256);
    assert_eq!(request.components[0].decode().unwrap(), archive);
}
