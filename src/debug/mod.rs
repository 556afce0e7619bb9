//! Debug-mode requests
//!
//! Debug mode points an installed component at a dev server on the local
//! machine. This module only checks the inputs and builds the request;
//! delivering it is up to the caller.

use fireberry_protocol::DebugRequest;
use regex_lite::Regex;
use tracing::debug;

use crate::manifest::Manifest;

/// Accepted debug URL shape: host and port, no scheme
const DEBUG_URL_PATTERN: &str = r"^localhost:\d+$";

/// Debug errors
#[derive(Debug, thiserror::Error)]
pub enum DebugError {
    #[error(
        "Invalid URL format: {url}. URL must be in format: localhost:[port] (e.g., localhost:3000)\nDo not include http:// or https://"
    )]
    InvalidUrl { url: String },

    #[error("Component with ID \"{id}\" not found in manifest.\nAvailable components:\n{available}")]
    ComponentNotFound { id: String, available: String },

    #[error("URL is required when starting debug mode.\nUsage: fireberry debug {id} localhost:[port]")]
    UrlRequired { id: String },

    #[error("failed to serialize manifest: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Check that `url` looks like `localhost:<port>`
pub fn validate_debug_url(url: &str) -> Result<(), DebugError> {
    let matches = Regex::new(DEBUG_URL_PATTERN)
        .map(|re| re.is_match(url))
        .unwrap_or(false);

    if matches {
        Ok(())
    } else {
        Err(DebugError::InvalidUrl {
            url: url.to_string(),
        })
    }
}

/// Build the request that starts (or, with `stop`, ends) debug mode for a
/// component
///
/// Stopping ignores any URL given.
pub fn prepare(
    manifest: &Manifest,
    component_id: &str,
    url: Option<&str>,
    stop: bool,
) -> Result<DebugRequest, DebugError> {
    if manifest.find_component(component_id).is_none() {
        return Err(DebugError::ComponentNotFound {
            id: component_id.to_string(),
            available: manifest.component_listing(),
        });
    }

    let debug_url = if stop {
        None
    } else {
        let url = url.ok_or_else(|| DebugError::UrlRequired {
            id: component_id.to_string(),
        })?;
        validate_debug_url(url)?;
        Some(url.to_string())
    };

    let manifest = manifest.to_json_value()?;

    debug!(
        "debug request for {}: {}",
        component_id,
        debug_url.as_deref().unwrap_or("stop")
    );

    Ok(DebugRequest {
        component_id: component_id.to_string(),
        manifest,
        debug_url,
    })
}
