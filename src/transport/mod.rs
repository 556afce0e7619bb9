//! Registry transport
//!
//! The pipeline itself performs no network I/O. Packaged components are
//! handed to a [`Registry`], and the API token comes from a
//! [`CredentialStore`]. Provides:
//! - FileCredentialStore: reads the token from the user config directory
//! - DirectoryRegistry: writes the push payload into an outbox directory

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use fireberry_protocol::PushRequest;
use serde::Deserialize;
use tracing::{info, warn};

use crate::bundle::archive_file_name;
use crate::config::user_config_dir;
use crate::manifest::Manifest;
use crate::pipeline::PackagedComponent;

/// File name of the credential file inside the user config directory
pub const CREDENTIALS_FILE: &str = "config.json";

/// File name of the push payload inside an outbox
pub const PUSH_PAYLOAD_FILE: &str = "push.json";

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("component id \"{id}\" cannot be used as a file name")]
    UnsafeId { id: String },
}

/// Source of the API token used to authenticate with the registry
pub trait CredentialStore: Send + Sync {
    /// The token, or `None` when no usable token is stored
    fn token(&self) -> Option<String>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCredentials {
    #[serde(default)]
    api_token: Option<String>,
}

/// Credential store backed by `config.json` (`{"apiToken": "..."}`)
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the user config directory
    pub fn user() -> Option<Self> {
        user_config_dir().map(|dir| Self::new(dir.join(CREDENTIALS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn token(&self) -> Option<String> {
        if !self.path.is_file() {
            return None;
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read config file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<StoredCredentials>(&content) {
            Ok(stored) => stored.api_token.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                warn!("Failed to read config file {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

/// Destination for packaged components
pub trait Registry: Send + Sync {
    /// Hand over every packaged component of one manifest
    fn push(
        &self,
        manifest: &Manifest,
        components: &[PackagedComponent],
    ) -> Result<(), TransportError>;
}

/// Build the wire payload for a push
pub fn push_request(
    manifest: &Manifest,
    components: &[PackagedComponent],
) -> Result<PushRequest, TransportError> {
    let builds = components.iter().map(PackagedComponent::to_wire).collect();
    Ok(PushRequest::new(
        manifest.app.id.clone(),
        builds,
        manifest.to_json_value()?,
    ))
}

/// Registry that writes `<id>.tar.gz` files and `push.json` into a directory
#[derive(Debug, Clone)]
pub struct DirectoryRegistry {
    outbox: PathBuf,
}

impl DirectoryRegistry {
    pub fn new(outbox: impl Into<PathBuf>) -> Self {
        Self {
            outbox: outbox.into(),
        }
    }

    pub fn outbox(&self) -> &Path {
        &self.outbox
    }

    fn write(&self, path: PathBuf, contents: &[u8]) -> Result<(), TransportError> {
        fs::write(&path, contents).map_err(|source| TransportError::Write { path, source })
    }
}

impl Registry for DirectoryRegistry {
    fn push(
        &self,
        manifest: &Manifest,
        components: &[PackagedComponent],
    ) -> Result<(), TransportError> {
        // Every id must map to a plain file name inside the outbox.
        let file_names = components
            .iter()
            .map(|component| {
                let name = archive_file_name(&component.id);
                if name == format!("{}.tar.gz", component.id) {
                    Ok(name)
                } else {
                    Err(TransportError::UnsafeId {
                        id: component.id.clone(),
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        fs::create_dir_all(&self.outbox).map_err(|source| TransportError::Write {
            path: self.outbox.clone(),
            source,
        })?;

        for (component, file_name) in components.iter().zip(&file_names) {
            self.write(self.outbox.join(file_name), &component.build)?;
        }

        let request = push_request(manifest, components)?;
        let json = serde_json::to_vec_pretty(&request)?;
        self.write(self.outbox.join(PUSH_PAYLOAD_FILE), &json)?;

        info!(
            "wrote {} component(s), {} bytes, to {}",
            components.len(),
            request.total_size(),
            self.outbox.display()
        );
        Ok(())
    }
}
