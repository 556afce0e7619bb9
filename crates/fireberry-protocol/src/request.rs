//! Request bodies sent to the registry.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ProtocolError;
use crate::BUILD_FORMAT;

/// One packaged component inside a push request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentBuild {
    /// Display title of the component.
    pub title: String,
    /// Component identifier, unique within the app.
    pub id: String,
    /// Base64-encoded archive bytes.
    pub build: String,
    /// SHA-256 hex digest of the raw archive bytes.
    pub sha256: String,
    /// Size of the raw archive in bytes.
    pub size: u64,
    /// Archive format.
    pub format: String,
}

impl ComponentBuild {
    /// Encode raw archive bytes into a build entry.
    pub fn from_bytes(title: impl Into<String>, id: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            title: title.into(),
            id: id.into(),
            build: STANDARD.encode(bytes),
            sha256: hex::encode(Sha256::digest(bytes)),
            size: bytes.len() as u64,
            format: BUILD_FORMAT.to_string(),
        }
    }

    /// Decode the archive bytes and check them against the recorded digest.
    pub fn decode(&self) -> Result<Vec<u8>, ProtocolError> {
        let bytes = STANDARD
            .decode(&self.build)
            .map_err(|source| ProtocolError::InvalidBase64 {
                id: self.id.clone(),
                source,
            })?;

        let actual = hex::encode(Sha256::digest(&bytes));
        if actual != self.sha256 {
            return Err(ProtocolError::DigestMismatch {
                id: self.id.clone(),
                expected: self.sha256.clone(),
                actual,
            });
        }

        Ok(bytes)
    }
}

/// Body of the push operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushRequest {
    /// Payload layout version.
    pub version: u32,
    /// Application identifier from the manifest.
    pub app_id: String,
    /// Packaged components in manifest order.
    pub components: Vec<ComponentBuild>,
    /// The manifest the components were packaged from.
    pub manifest: serde_json::Value,
}

impl PushRequest {
    /// Create a push request at the current payload version.
    pub fn new(
        app_id: impl Into<String>,
        components: Vec<ComponentBuild>,
        manifest: serde_json::Value,
    ) -> Self {
        Self {
            version: crate::PAYLOAD_VERSION,
            app_id: app_id.into(),
            components,
            manifest,
        }
    }

    /// Total raw archive bytes across all components.
    pub fn total_size(&self) -> u64 {
        self.components.iter().map(|c| c.size).sum()
    }
}

/// Body of the debug operation.
///
/// A missing `debug_url` stops debug mode for the component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugRequest {
    pub component_id: String,
    pub manifest: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_url: Option<String>,
}

impl DebugRequest {
    /// Whether this request starts (rather than stops) debug mode.
    pub fn is_start(&self) -> bool {
        self.debug_url.is_some()
    }
}
