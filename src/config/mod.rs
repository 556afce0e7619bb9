//! Pack configuration
//!
//! Layers, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. User config (~/.config/fireberry/config.toml)
//! 3. Project config (.fireberry.toml next to the manifest)
//! 4. CLI overrides

mod defaults;
mod effective;

pub use defaults::{PackConfig, DEFAULT_MANIFEST_FILE, DEFAULT_SCRATCH_PREFIX};
pub use effective::{ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig};

use std::path::{Path, PathBuf};

/// File name of the project-level config
pub const PROJECT_CONFIG_FILE: &str = ".fireberry.toml";

/// Directory holding per-user Fireberry state (config.toml, config.json)
///
/// Honors `XDG_CONFIG_HOME`, then falls back to `$HOME/.config`.
pub fn user_config_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(xdg).join("fireberry"));
    }
    std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(|home| PathBuf::from(home).join(".config").join("fireberry"))
}

/// Path of the user-level config file, if a config dir can be determined
pub fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|dir| dir.join("config.toml"))
}

/// Path of the project-level config file for a working directory
pub fn project_config_path(working_dir: &Path) -> PathBuf {
    working_dir.join(PROJECT_CONFIG_FILE)
}
