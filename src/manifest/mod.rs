//! App manifest
//!
//! The manifest (`manifest.yml`) describes one app and its UI components.
//! Component settings are kept untyped here; they only become trusted
//! values after passing through [`crate::component::validate_component`].

mod authoring;
mod loader;

pub use authoring::NewComponent;
pub use loader::{load_manifest, load_manifest_file, manifest_path};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Manifest errors
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("No {file} found at {}. Run this command from your Fireberry app directory.", .dir.display())]
    NotFound { file: String, dir: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is malformed: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("{} app section must contain a non-empty '{field}' field", .path.display())]
    Incomplete { path: PathBuf, field: &'static str },

    #[error("component title must not be empty")]
    EmptyComponentTitle,

    #[error("component with title \"{title}\" already exists in the manifest")]
    DuplicateComponentTitle { title: String },

    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The `app` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppInfo {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Keys this tool does not interpret, kept for rewrites
    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

/// Settings exactly as written in the manifest, not yet checked against
/// the component type's schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSettings(Option<serde_yaml::Value>);

impl RawSettings {
    /// Wrap an arbitrary YAML value
    pub fn new(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => Self(None),
            other => Self(Some(other)),
        }
    }

    /// No settings block at all (or an explicit null)
    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    pub(crate) fn as_mapping(&self) -> Option<&serde_yaml::Mapping> {
        self.0.as_ref().and_then(|v| v.as_mapping())
    }
}

/// One entry of the `components` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawComponent {
    /// Type tag, e.g. `record`
    #[serde(rename = "type")]
    pub component_type: String,

    /// Display label; not required to be unique
    pub title: String,

    /// Identifier, unique within the manifest
    pub id: String,

    /// Build output, relative to the working directory
    pub path: String,

    #[serde(default, skip_serializing_if = "RawSettings::is_absent")]
    pub settings: RawSettings,

    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

/// Root of `manifest.yml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub app: AppInfo,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<RawComponent>,

    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

impl Manifest {
    /// Find a component by identifier
    pub fn find_component(&self, id: &str) -> Option<&RawComponent> {
        self.components.iter().find(|c| c.id == id)
    }

    /// `  - title (id)` lines for every component, for error messages
    pub fn component_listing(&self) -> String {
        self.components
            .iter()
            .map(|c| format!("  - {} ({})", c.title, c.id))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Convert to a JSON value for registry payloads
    pub fn to_json_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Serialize back to YAML
    pub fn to_yaml(&self) -> Result<String, ManifestError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
