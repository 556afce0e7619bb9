//! Component types and trusted settings
//!
//! A [`RawComponent`](crate::manifest::RawComponent) becomes a
//! [`ValidatedComponent`] only through [`validate_component`]. The trusted
//! settings types have no public constructors, so downstream stages can
//! never consume unchecked settings.

mod schema;
mod unique;

pub use schema::{validate_component, SchemaRules, SettingsProblem};
pub use unique::check_unique_ids;

use std::fmt;
use std::str::FromStr;

/// Installed component types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Record,
    GlobalMenu,
    SideMenu,
}

impl ComponentType {
    /// Every installed type, in display order
    pub const ALL: [ComponentType; 3] = [
        ComponentType::Record,
        ComponentType::GlobalMenu,
        ComponentType::SideMenu,
    ];

    /// Manifest tag for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Record => "record",
            ComponentType::GlobalMenu => "global-menu",
            ComponentType::SideMenu => "side-menu",
        }
    }

    /// Comma-separated list of all tags
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = ComponentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ComponentError::InvalidTypeName {
                name: s.to_string(),
                supported: Self::supported_list(),
            })
    }
}

/// Component-level errors
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("Component \"{title}\" has unsupported type: {component_type}. Supported types: {supported}")]
    TypeUnsupported {
        title: String,
        component_type: String,
        supported: String,
    },

    #[error("Component \"{title}\" (type: {component_type}) setting \"{field}\" {problem}")]
    SettingsInvalid {
        title: String,
        component_type: ComponentType,
        field: String,
        problem: SettingsProblem,
    },

    #[error("All component ids must be unique: \"{id}\" is used by \"{first_title}\" and \"{second_title}\"")]
    DuplicateId {
        id: String,
        first_title: String,
        second_title: String,
    },

    #[error("Invalid component type: \"{name}\". Valid types are: {supported}")]
    InvalidTypeName { name: String, supported: String },
}

/// One of a configured set of size values (`height`, `width`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeOption(String);

impl SizeOption {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SizeOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Settings of a `record` component
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSettings {
    icon_name: String,
    icon_color: String,
    object_type: serde_yaml::Number,
    height: SizeOption,
}

impl RecordSettings {
    pub fn icon_name(&self) -> &str {
        &self.icon_name
    }

    pub fn icon_color(&self) -> &str {
        &self.icon_color
    }

    pub fn object_type(&self) -> &serde_yaml::Number {
        &self.object_type
    }

    pub fn height(&self) -> &SizeOption {
        &self.height
    }
}

/// Settings of a `global-menu` component
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalMenuSettings {
    display_name: String,
    icon_name: Option<String>,
}

impl GlobalMenuSettings {
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn icon_name(&self) -> Option<&str> {
        self.icon_name.as_deref()
    }
}

/// Settings of a `side-menu` component
#[derive(Debug, Clone, PartialEq)]
pub struct SideMenuSettings {
    icon_name: String,
    width: SizeOption,
}

impl SideMenuSettings {
    pub fn icon_name(&self) -> &str {
        &self.icon_name
    }

    pub fn width(&self) -> &SizeOption {
        &self.width
    }
}

/// Settings that satisfied their type's schema
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentSettings {
    Record(RecordSettings),
    GlobalMenu(GlobalMenuSettings),
    SideMenu(SideMenuSettings),
}

impl ComponentSettings {
    pub fn component_type(&self) -> ComponentType {
        match self {
            ComponentSettings::Record(_) => ComponentType::Record,
            ComponentSettings::GlobalMenu(_) => ComponentType::GlobalMenu,
            ComponentSettings::SideMenu(_) => ComponentType::SideMenu,
        }
    }
}

/// A component whose settings passed schema validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedComponent {
    title: String,
    id: String,
    path: String,
    settings: ComponentSettings,
}

impl ValidatedComponent {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Build output path, relative to the working directory
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn settings(&self) -> &ComponentSettings {
        &self.settings
    }

    pub fn component_type(&self) -> ComponentType {
        self.settings.component_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags_round_trip() {
        for t in ComponentType::ALL {
            assert_eq!(t.as_str().parse::<ComponentType>().unwrap(), t);
        }
    }

    #[test]
    fn test_unknown_type_name() {
        let err = "page".parse::<ComponentType>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid component type: \"page\". Valid types are: record, global-menu, side-menu"
        );
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        assert!("Record".parse::<ComponentType>().is_err());
    }
}
