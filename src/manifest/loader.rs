//! Manifest loader
//!
//! Reads `manifest.yml` from a working directory. The manifest is re-read on
//! every invocation and never cached.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{AppInfo, Manifest, ManifestError, RawComponent};
use crate::config::DEFAULT_MANIFEST_FILE;

/// Shape accepted from disk before the `app` section is checked
#[derive(serde::Deserialize)]
struct ManifestDocument {
    app: Option<AppInfo>,
    #[serde(default)]
    components: Option<Vec<serde_yaml::Value>>,
    #[serde(flatten)]
    extra: serde_yaml::Mapping,
}

/// Path of the manifest file for a working directory
pub fn manifest_path(working_dir: &Path, file_name: &str) -> PathBuf {
    working_dir.join(file_name)
}

/// Load `manifest.yml` from `working_dir`
pub fn load_manifest(working_dir: &Path) -> Result<Manifest, ManifestError> {
    load_manifest_file(working_dir, DEFAULT_MANIFEST_FILE)
}

/// Load the manifest named `file_name` from `working_dir`
pub fn load_manifest_file(working_dir: &Path, file_name: &str) -> Result<Manifest, ManifestError> {
    let path = manifest_path(working_dir, file_name);

    if !path.is_file() {
        return Err(ManifestError::NotFound {
            file: file_name.to_string(),
            dir: working_dir.to_path_buf(),
        });
    }

    let content = fs::read_to_string(&path).map_err(|source| ManifestError::Read {
        path: path.clone(),
        source,
    })?;
    debug!("read {} bytes from {}", content.len(), path.display());

    let manifest = parse_manifest(&path, &content)?;

    info!(
        "Loaded manifest: {} ({}) with {} component(s)",
        manifest.app.name,
        manifest.app.id,
        manifest.components.len()
    );
    Ok(manifest)
}

fn parse_manifest(path: &Path, content: &str) -> Result<Manifest, ManifestError> {
    let malformed = |reason: String| ManifestError::Malformed {
        path: path.to_path_buf(),
        reason,
    };

    let value: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| malformed(e.to_string()))?;
    if value.is_null() {
        return Err(malformed("manifest must contain an 'app' section".to_string()));
    }

    let document: ManifestDocument =
        serde_yaml::from_value(value).map_err(|e| malformed(e.to_string()))?;

    let app = document
        .app
        .ok_or_else(|| malformed("manifest must contain an 'app' section".to_string()))?;

    if app.id.trim().is_empty() {
        return Err(ManifestError::Incomplete {
            path: path.to_path_buf(),
            field: "id",
        });
    }
    if app.name.trim().is_empty() {
        return Err(ManifestError::Incomplete {
            path: path.to_path_buf(),
            field: "name",
        });
    }

    let components = document
        .components
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, value)| parse_component(index, value).map_err(&malformed))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Manifest {
        app,
        components,
        extra: document.extra,
    })
}

/// Parse one `components` entry, naming it by position (and title, when
/// readable) on failure
fn parse_component(index: usize, value: serde_yaml::Value) -> Result<RawComponent, String> {
    let title = value
        .get("title")
        .and_then(|t| t.as_str())
        .map(|t| format!(" \"{}\"", t))
        .unwrap_or_default();

    serde_yaml::from_value(value)
        .map_err(|e| format!("component #{}{}: {}", index + 1, title, e))
}
