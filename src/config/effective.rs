//! Effective configuration with provenance
//!
//! Captures the merged configuration plus where each layer came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::debug;

use super::defaults::PackConfig;

/// Origin of a configuration source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    User,
    Project,
    Cli,
}

/// A contributing config source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Errors while building the effective configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Merged configuration and the sources that produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    /// When this config was computed
    pub created_at: DateTime<Utc>,

    /// The merged configuration
    pub config: PackConfig,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,
}

impl EffectiveConfig {
    /// Build the effective config from explicit layer paths
    ///
    /// Missing files are skipped; unreadable or malformed files are errors.
    pub fn build(
        user_config_path: Option<&Path>,
        project_config_path: Option<&Path>,
        cli_overrides: Option<toml::Table>,
    ) -> Result<Self, ConfigError> {
        let mut merged = builtin_table()?;
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }];

        for (origin, path) in [
            (ConfigOrigin::User, user_config_path),
            (ConfigOrigin::Project, project_config_path),
        ] {
            let Some(path) = path else { continue };
            if !path.exists() {
                continue;
            }
            let (table, digest) = load_toml_file(path)?;
            overlay(&mut merged, table);
            debug!("config layer {:?} loaded from {}", origin, path.display());
            sources.push(ConfigSource {
                origin,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(cli) = cli_overrides {
            if !cli.is_empty() {
                overlay(&mut merged, cli);
                sources.push(ConfigSource {
                    origin: ConfigOrigin::Cli,
                    path: None,
                    digest: None,
                });
            }
        }

        let config: PackConfig = toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse {
                path: "<merged>".to_string(),
                message: e.to_string(),
            })?;

        validate(&config)?;

        Ok(Self {
            created_at: Utc::now(),
            config,
            sources,
        })
    }

    /// Build the effective config using the standard user and project paths
    pub fn discover(
        working_dir: &Path,
        cli_overrides: Option<toml::Table>,
    ) -> Result<Self, ConfigError> {
        let user = super::user_config_path();
        let project = super::project_config_path(working_dir);
        Self::build(user.as_deref(), Some(&project), cli_overrides)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn builtin_table() -> Result<toml::Table, ConfigError> {
    match toml::Value::try_from(PackConfig::default()) {
        Ok(toml::Value::Table(table)) => Ok(table),
        Ok(_) => Err(ConfigError::Invalid("defaults are not a table".to_string())),
        Err(e) => Err(ConfigError::Invalid(e.to_string())),
    }
}

/// Top-level keys replace; the config has no nested tables.
fn overlay(base: &mut toml::Table, layer: toml::Table) {
    for (key, value) in layer {
        base.insert(key, value);
    }
}

/// Read a TOML file, returning its table and the SHA-256 of the raw bytes
fn load_toml_file(path: &Path) -> Result<(toml::Table, String), ConfigError> {
    let display = path.to_string_lossy().to_string();
    let bytes = fs::read(path).map_err(|source| ConfigError::Io {
        path: display.clone(),
        source,
    })?;

    let digest = hex::encode(Sha256::digest(&bytes));

    let contents = String::from_utf8(bytes).map_err(|e| ConfigError::Parse {
        path: display.clone(),
        message: format!("invalid UTF-8: {}", e),
    })?;

    let table: toml::Table = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: display,
        message: e.to_string(),
    })?;

    Ok((table, digest))
}

fn validate(config: &PackConfig) -> Result<(), ConfigError> {
    if config.manifest_file.trim().is_empty() {
        return Err(ConfigError::Invalid("manifest_file must not be empty".to_string()));
    }
    if config.height_options.is_empty() {
        return Err(ConfigError::Invalid("height_options must not be empty".to_string()));
    }
    if config.width_options.is_empty() {
        return Err(ConfigError::Invalid("width_options must not be empty".to_string()));
    }
    if config.scratch_prefix.is_empty() {
        return Err(ConfigError::Invalid("scratch_prefix must not be empty".to_string()));
    }
    if config.scratch_prefix.contains(['/', '\\']) {
        return Err(ConfigError::Invalid(format!(
            "scratch_prefix must not contain path separators: {}",
            config.scratch_prefix
        )));
    }
    Ok(())
}
