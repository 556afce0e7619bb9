//! Manifest authoring
//!
//! Appends new components and writes the manifest back to disk.
//! Interactive prompting and project scaffolding live outside this crate.

use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use super::{Manifest, ManifestError, RawComponent, RawSettings};
use crate::component::ComponentType;

const DEFAULT_ICON_NAME: &str = "related-single";
const DEFAULT_ICON_COLOR: &str = "#7aae7f";
const DEFAULT_DISPLAY_NAME: &str = "Global Menu";
const DEFAULT_SIZE: &str = "M";

/// A component about to be added to the manifest
#[derive(Debug, Clone)]
pub struct NewComponent {
    name: String,
    component_type: ComponentType,
    settings: Mapping,
}

impl NewComponent {
    /// Start from the default settings for `component_type`
    pub fn new(name: impl Into<String>, component_type: ComponentType) -> Self {
        let mut settings = Mapping::new();
        let mut set = |key: &str, value: Value| {
            settings.insert(Value::String(key.to_string()), value);
        };

        match component_type {
            ComponentType::Record => {
                set("iconName", DEFAULT_ICON_NAME.into());
                set("iconColor", DEFAULT_ICON_COLOR.into());
                set("objectType", 0.into());
                set("height", DEFAULT_SIZE.into());
            }
            ComponentType::GlobalMenu => {
                set("displayName", DEFAULT_DISPLAY_NAME.into());
                set("iconName", DEFAULT_ICON_NAME.into());
            }
            ComponentType::SideMenu => {
                set("iconName", DEFAULT_ICON_NAME.into());
                set("width", DEFAULT_SIZE.into());
            }
        }

        Self {
            name: name.into().trim().to_string(),
            component_type,
            settings,
        }
    }

    /// Override one setting
    pub fn with_setting(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.settings.insert(Value::String(key.to_string()), value.into());
        self
    }

    /// Finish into a manifest entry with a fresh identifier
    pub fn into_raw(self) -> RawComponent {
        RawComponent {
            component_type: self.component_type.to_string(),
            path: format!("{}/dist", self.name),
            title: self.name,
            id: Uuid::new_v4().to_string(),
            settings: RawSettings::new(Value::Mapping(self.settings)),
            extra: Mapping::new(),
        }
    }
}

impl Manifest {
    /// Append a component; titles must be unique and non-empty
    pub fn add_component(&mut self, component: RawComponent) -> Result<(), ManifestError> {
        if component.title.trim().is_empty() {
            return Err(ManifestError::EmptyComponentTitle);
        }
        if self.components.iter().any(|c| c.title == component.title) {
            return Err(ManifestError::DuplicateComponentTitle {
                title: component.title,
            });
        }
        info!("adding component {} ({})", component.title, component.id);
        self.components.push(component);
        Ok(())
    }

    /// Write the manifest as YAML to `path`
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let yaml = self.to_yaml()?;
        fs::write(path, yaml).map_err(|source| ManifestError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
