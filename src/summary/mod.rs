//! Pack summary
//!
//! What `fireberry pack` reports: a human-readable listing for the terminal
//! and a JSON document for tooling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::{PackagedComponent, PipelineError};

/// Schema version for the JSON summary
pub const PACK_SUMMARY_SCHEMA_VERSION: u32 = 1;

/// Schema identifier for the JSON summary
pub const PACK_SUMMARY_SCHEMA_ID: &str = "fireberry/pack_summary@1";

/// Outcome of a pack run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failed,
}

/// One packaged component as reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEntry {
    pub title: String,
    pub id: String,
    pub size_bytes: u64,
    pub sha256: String,
}

impl From<&PackagedComponent> for ComponentEntry {
    fn from(package: &PackagedComponent) -> Self {
        Self {
            title: package.title.clone(),
            id: package.id.clone(),
            size_bytes: package.size(),
            sha256: package.sha256.clone(),
        }
    }
}

/// Pack summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackSummary {
    pub schema_version: u32,
    pub schema_id: String,
    pub created_at: DateTime<Utc>,
    pub status: Status,
    pub exit_code: i32,

    /// Application identifier, absent when the manifest never loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,

    /// Packaged components in manifest order
    pub components: Vec<ComponentEntry>,

    /// Failure classification, e.g. `COMPONENT_PATH_MISSING`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,

    pub human_summary: String,
}

impl PackSummary {
    /// Summary of a successful run
    pub fn success(
        app_id: impl Into<String>,
        components: &[PackagedComponent],
        duration_ms: u64,
    ) -> Self {
        let components: Vec<ComponentEntry> = components.iter().map(ComponentEntry::from).collect();
        let human_summary = Self::generate_human_summary(&components);
        Self {
            schema_version: PACK_SUMMARY_SCHEMA_VERSION,
            schema_id: PACK_SUMMARY_SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            status: Status::Success,
            exit_code: 0,
            app_id: Some(app_id.into()),
            components,
            error_kind: None,
            error_message: None,
            duration_ms,
            human_summary,
        }
    }

    /// Summary of a failed run; nothing was packaged
    pub fn failure(error: &PipelineError, duration_ms: u64) -> Self {
        let kind = serde_json::to_value(error.kind())
            .ok()
            .and_then(|v| v.as_str().map(str::to_string));
        Self {
            schema_version: PACK_SUMMARY_SCHEMA_VERSION,
            schema_id: PACK_SUMMARY_SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            status: Status::Failed,
            exit_code: error.exit_code(),
            app_id: None,
            components: Vec::new(),
            error_kind: kind,
            error_message: Some(error.to_string()),
            duration_ms,
            human_summary: format!("Pack failed: {}", error),
        }
    }

    fn generate_human_summary(components: &[ComponentEntry]) -> String {
        match components.len() {
            0 => "No components to push".to_string(),
            1 => "1 component validated and zipped".to_string(),
            n => format!("{} components validated and zipped", n),
        }
    }

    /// Headline plus one numbered line per component
    pub fn render_human(&self) -> String {
        let mut out = self.human_summary.clone();
        for (idx, entry) in self.components.iter().enumerate() {
            out.push('\n');
            out.push_str(&format!(
                "  {}. {} ({}) - {} KB",
                idx + 1,
                entry.title,
                entry.id,
                format_kb(entry.size_bytes)
            ));
        }
        out
    }

    /// Total archive bytes across all components
    pub fn total_bytes(&self) -> u64 {
        self.components.iter().map(|c| c.size_bytes).sum()
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Size in kilobytes with two decimals
pub fn format_kb(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / 1024.0)
}
