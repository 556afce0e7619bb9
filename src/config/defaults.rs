//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Manifest file name looked up in the working directory
pub const DEFAULT_MANIFEST_FILE: &str = "manifest.yml";

/// Prefix of every scratch directory created by the packager
pub const DEFAULT_SCRATCH_PREFIX: &str = "fireberry-";

/// Resolved configuration for one packaging run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackConfig {
    /// Manifest file, relative to the working directory
    pub manifest_file: String,

    /// Allowed values for `record` `height`
    pub height_options: Vec<String>,

    /// Allowed values for `side-menu` `width`
    pub width_options: Vec<String>,

    /// Prefix for scratch directory names
    pub scratch_prefix: String,

    /// Where scratch directories are created (None = system temp dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratch_root: Option<PathBuf>,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            manifest_file: DEFAULT_MANIFEST_FILE.to_string(),
            height_options: size_options(),
            width_options: size_options(),
            scratch_prefix: DEFAULT_SCRATCH_PREFIX.to_string(),
            scratch_root: None,
        }
    }
}

impl PackConfig {
    /// Scratch root, falling back to the system temporary directory
    pub fn scratch_root(&self) -> PathBuf {
        self.scratch_root
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

fn size_options() -> Vec<String> {
    ["S", "M", "L"].iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PackConfig::default();
        assert_eq!(config.manifest_file, "manifest.yml");
        assert_eq!(config.height_options, vec!["S", "M", "L"]);
        assert_eq!(config.width_options, vec!["S", "M", "L"]);
        assert_eq!(config.scratch_prefix, "fireberry-");
        assert_eq!(config.scratch_root(), std::env::temp_dir());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: PackConfig = toml::from_str(r#"height_options = ["S", "XL"]"#).unwrap();
        assert_eq!(config.height_options, vec!["S", "XL"]);
        assert_eq!(config.width_options, vec!["S", "M", "L"]);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: Result<PackConfig, _> = toml::from_str("heights = []");
        assert!(result.is_err());
    }
}
