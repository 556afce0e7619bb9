//! Per-type settings schemas
//!
//! Dispatches on the component's type tag and checks its raw settings
//! against that type's schema. Pure, no I/O.

use serde_yaml::{Mapping, Value};
use std::fmt;
use tracing::debug;

use super::{
    ComponentError, ComponentSettings, ComponentType, GlobalMenuSettings, RecordSettings,
    SideMenuSettings, SizeOption, ValidatedComponent,
};
use crate::config::PackConfig;
use crate::manifest::RawComponent;

/// Allowed enum values, taken from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRules {
    height_options: Vec<String>,
    width_options: Vec<String>,
}

impl SchemaRules {
    pub fn new(height_options: Vec<String>, width_options: Vec<String>) -> Self {
        Self {
            height_options,
            width_options,
        }
    }

    pub fn from_config(config: &PackConfig) -> Self {
        Self::new(config.height_options.clone(), config.width_options.clone())
    }

    pub fn height_options(&self) -> &[String] {
        &self.height_options
    }

    pub fn width_options(&self) -> &[String] {
        &self.width_options
    }
}

impl Default for SchemaRules {
    fn default() -> Self {
        Self::from_config(&PackConfig::default())
    }
}

/// Why a setting was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsProblem {
    /// Absent, null or blank
    Missing,
    /// Present with the wrong primitive kind
    WrongKind { expected: &'static str },
    /// Outside the configured set of values
    NotAllowed { allowed: Vec<String> },
}

impl fmt::Display for SettingsProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsProblem::Missing => write!(f, "is missing"),
            SettingsProblem::WrongKind { expected } => write!(f, "must be a {}", expected),
            SettingsProblem::NotAllowed { allowed } => {
                write!(f, "must be one of: {}", allowed.join(" | "))
            }
        }
    }
}

/// Check one component's settings against its declared type's schema
pub fn validate_component(
    raw: &RawComponent,
    rules: &SchemaRules,
) -> Result<ValidatedComponent, ComponentError> {
    let component_type: ComponentType =
        raw.component_type
            .parse()
            .map_err(|_| ComponentError::TypeUnsupported {
                title: raw.title.clone(),
                component_type: raw.component_type.clone(),
                supported: ComponentType::supported_list(),
            })?;

    let reader = SettingsReader::new(raw, component_type)?;

    let settings = match component_type {
        ComponentType::Record => ComponentSettings::Record(record(&reader, rules)?),
        ComponentType::GlobalMenu => ComponentSettings::GlobalMenu(global_menu(&reader)?),
        ComponentType::SideMenu => ComponentSettings::SideMenu(side_menu(&reader, rules)?),
    };

    debug!("component {} ({}) settings valid for {}", raw.title, raw.id, component_type);

    Ok(ValidatedComponent {
        title: raw.title.clone(),
        id: raw.id.clone(),
        path: raw.path.clone(),
        settings,
    })
}

fn record(
    reader: &SettingsReader<'_>,
    rules: &SchemaRules,
) -> Result<RecordSettings, ComponentError> {
    Ok(RecordSettings {
        icon_name: reader.required_str("iconName")?,
        icon_color: reader.required_str("iconColor")?,
        object_type: reader.required_number("objectType")?,
        height: reader.required_option("height", rules.height_options())?,
    })
}

fn global_menu(reader: &SettingsReader<'_>) -> Result<GlobalMenuSettings, ComponentError> {
    Ok(GlobalMenuSettings {
        display_name: reader.required_str("displayName")?,
        icon_name: reader.optional_str("iconName")?,
    })
}

fn side_menu(
    reader: &SettingsReader<'_>,
    rules: &SchemaRules,
) -> Result<SideMenuSettings, ComponentError> {
    Ok(SideMenuSettings {
        icon_name: reader.required_str("iconName")?,
        width: reader.required_option("width", rules.width_options())?,
    })
}

/// Typed field access over a raw settings mapping
struct SettingsReader<'a> {
    title: &'a str,
    component_type: ComponentType,
    map: &'a Mapping,
}

impl<'a> SettingsReader<'a> {
    fn new(raw: &'a RawComponent, component_type: ComponentType) -> Result<Self, ComponentError> {
        let invalid = |problem| ComponentError::SettingsInvalid {
            title: raw.title.clone(),
            component_type,
            field: "settings".to_string(),
            problem,
        };

        if raw.settings.is_absent() {
            return Err(invalid(SettingsProblem::Missing));
        }
        let map = raw
            .settings
            .as_mapping()
            .ok_or_else(|| invalid(SettingsProblem::WrongKind { expected: "mapping" }))?;

        Ok(Self {
            title: &raw.title,
            component_type,
            map,
        })
    }

    fn invalid(&self, field: &str, problem: SettingsProblem) -> ComponentError {
        ComponentError::SettingsInvalid {
            title: self.title.to_string(),
            component_type: self.component_type,
            field: field.to_string(),
            problem,
        }
    }

    /// Present and non-null value for `field`
    fn value(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field).filter(|v| !v.is_null())
    }

    fn required_str(&self, field: &str) -> Result<String, ComponentError> {
        match self.value(field) {
            None => Err(self.invalid(field, SettingsProblem::Missing)),
            Some(Value::String(s)) if s.trim().is_empty() => {
                Err(self.invalid(field, SettingsProblem::Missing))
            }
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(self.invalid(field, SettingsProblem::WrongKind { expected: "string" })),
        }
    }

    fn optional_str(&self, field: &str) -> Result<Option<String>, ComponentError> {
        match self.value(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.invalid(field, SettingsProblem::WrongKind { expected: "string" })),
        }
    }

    fn required_number(&self, field: &str) -> Result<serde_yaml::Number, ComponentError> {
        match self.value(field) {
            None => Err(self.invalid(field, SettingsProblem::Missing)),
            Some(Value::Number(n)) => Ok(n.clone()),
            Some(_) => Err(self.invalid(field, SettingsProblem::WrongKind { expected: "number" })),
        }
    }

    fn required_option(
        &self,
        field: &str,
        allowed: &[String],
    ) -> Result<SizeOption, ComponentError> {
        let value = self.required_str(field)?;
        if allowed.iter().any(|a| *a == value) {
            Ok(SizeOption(value))
        } else {
            Err(self.invalid(
                field,
                SettingsProblem::NotAllowed {
                    allowed: allowed.to_vec(),
                },
            ))
        }
    }
}
