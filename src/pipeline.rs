//! Packaging pipeline
//!
//! Sequences one run over a manifest:
//! - Load the manifest
//! - Check component identifiers are unique
//! - For each component, in manifest order: validate settings, verify the
//!   build output, package it
//!
//! The run is fail-fast. The first error aborts it and no partial results
//! are returned.

use std::path::{Path, PathBuf};

use fireberry_protocol::ComponentBuild;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, warn};

use crate::artifact::{verify_build, ArtifactError, BuildArtifact};
use crate::bundle::{BundleError, Packager};
use crate::component::{
    check_unique_ids, validate_component, ComponentError, SchemaRules, ValidatedComponent,
};
use crate::config::{ConfigError, PackConfig};
use crate::debug::DebugError;
use crate::manifest::{load_manifest_file, Manifest, ManifestError};
use crate::state::{PipelineState, StateError, StateTracker};
use crate::transport::TransportError;

/// Flat classification of every pipeline failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ManifestNotFound,
    ManifestMalformed,
    ManifestIncomplete,
    ComponentTypeUnsupported,
    ComponentSettingsInvalid,
    DuplicateComponentId,
    ComponentPathMissing,
    ComponentBuildEmpty,
    PackagingFailed,
    Config,
    Authoring,
    Debug,
    Transport,
    Io,
    Internal,
}

impl ErrorKind {
    /// Stable process exit code
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::Config | ErrorKind::Io | ErrorKind::Internal => 1,
            ErrorKind::ManifestNotFound
            | ErrorKind::ManifestMalformed
            | ErrorKind::ManifestIncomplete => 2,
            ErrorKind::ComponentTypeUnsupported | ErrorKind::ComponentSettingsInvalid => 3,
            ErrorKind::DuplicateComponentId => 4,
            ErrorKind::ComponentPathMissing | ErrorKind::ComponentBuildEmpty => 5,
            ErrorKind::PackagingFailed => 6,
            ErrorKind::Transport => 7,
            ErrorKind::Authoring => 8,
            ErrorKind::Debug => 9,
        }
    }
}

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Manifest(#[from] ManifestError),

    #[error("{0}")]
    Component(#[from] ComponentError),

    #[error("{0}")]
    Artifact(#[from] ArtifactError),

    #[error("{0}")]
    Bundle(#[from] BundleError),

    #[error("{0}")]
    Debug(#[from] DebugError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("state error: {0}")]
    State(#[from] StateError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Config(_) => ErrorKind::Config,
            PipelineError::Manifest(e) => match e {
                ManifestError::NotFound { .. } => ErrorKind::ManifestNotFound,
                ManifestError::Malformed { .. } => ErrorKind::ManifestMalformed,
                ManifestError::Incomplete { .. } => ErrorKind::ManifestIncomplete,
                ManifestError::EmptyComponentTitle
                | ManifestError::DuplicateComponentTitle { .. } => ErrorKind::Authoring,
                ManifestError::Read { .. }
                | ManifestError::Serialize(_)
                | ManifestError::Write { .. } => ErrorKind::Io,
            },
            PipelineError::Component(e) => match e {
                ComponentError::TypeUnsupported { .. } | ComponentError::InvalidTypeName { .. } => {
                    ErrorKind::ComponentTypeUnsupported
                }
                ComponentError::SettingsInvalid { .. } => ErrorKind::ComponentSettingsInvalid,
                ComponentError::DuplicateId { .. } => ErrorKind::DuplicateComponentId,
            },
            PipelineError::Artifact(e) => match e {
                ArtifactError::PathMissing { .. } => ErrorKind::ComponentPathMissing,
                ArtifactError::BuildEmpty { .. } => ErrorKind::ComponentBuildEmpty,
                ArtifactError::Inspect { .. } => ErrorKind::Io,
            },
            PipelineError::Bundle(_) => ErrorKind::PackagingFailed,
            PipelineError::Debug(_) => ErrorKind::Debug,
            PipelineError::Transport(_) => ErrorKind::Transport,
            PipelineError::Serialization(_) => ErrorKind::Io,
            PipelineError::State(_) => ErrorKind::Internal,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// One component ready to hand to the registry
///
/// Holds no reference back to the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedComponent {
    pub title: String,
    pub id: String,
    /// Compressed archive bytes
    pub build: Vec<u8>,
    /// SHA-256 hex digest of `build`
    pub sha256: String,
}

impl PackagedComponent {
    fn new(component: &ValidatedComponent, build: Vec<u8>) -> Self {
        let sha256 = hex::encode(Sha256::digest(&build));
        Self {
            title: component.title().to_string(),
            id: component.id().to_string(),
            build,
            sha256,
        }
    }

    pub fn size(&self) -> u64 {
        self.build.len() as u64
    }

    /// Wire form for push requests
    pub fn to_wire(&self) -> ComponentBuild {
        ComponentBuild::from_bytes(self.title.clone(), self.id.clone(), &self.build)
    }
}

/// A component whose settings and build output both checked out
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedComponent {
    pub component: ValidatedComponent,
    pub artifact: BuildArtifact,
}

/// Output of a full run: the manifest and its packages, in manifest order
#[derive(Debug, Clone)]
pub struct PackOutcome {
    pub manifest: Manifest,
    pub components: Vec<PackagedComponent>,
}

/// Pipeline execution context
pub struct Pipeline {
    working_dir: PathBuf,
    manifest_file: String,
    rules: SchemaRules,
    packager: Packager,
    tracker: StateTracker,
}

impl Pipeline {
    /// Create a pipeline rooted at `working_dir`
    pub fn new(working_dir: impl Into<PathBuf>, config: &PackConfig) -> Self {
        Self {
            working_dir: working_dir.into(),
            manifest_file: config.manifest_file.clone(),
            rules: SchemaRules::from_config(config),
            packager: Packager::from_config(config),
            tracker: StateTracker::new(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// State reached by the most recent run
    pub fn state(&self) -> PipelineState {
        self.tracker.state()
    }

    /// States visited by the most recent run
    pub fn history(&self) -> &[PipelineState] {
        self.tracker.history()
    }

    /// Load the manifest and package every component
    pub fn run(&mut self) -> PipelineResult<PackOutcome> {
        self.tracker = StateTracker::new();
        self.guarded(|p| {
            let manifest = p.load()?;
            let components = p.package_loaded(&manifest)?;
            Ok(PackOutcome {
                manifest,
                components,
            })
        })
    }

    /// Load the manifest and run every check without packaging
    pub fn check(&mut self) -> PipelineResult<(Manifest, Vec<VerifiedComponent>)> {
        self.tracker = StateTracker::new();
        self.guarded(|p| {
            let manifest = p.load()?;
            p.tracker.transition(PipelineState::Validating)?;
            check_unique_ids(&manifest.components)?;

            let mut verified = Vec::with_capacity(manifest.components.len());
            for (index, raw) in manifest.components.iter().enumerate() {
                if index > 0 {
                    p.tracker.transition(PipelineState::Validating)?;
                }
                let component = validate_component(raw, &p.rules)?;

                p.tracker.transition(PipelineState::Verifying)?;
                let artifact = verify_build(&component, &p.working_dir)?;
                verified.push(VerifiedComponent {
                    component,
                    artifact,
                });
            }

            p.tracker.transition(PipelineState::Done)?;
            Ok((manifest, verified))
        })
    }

    /// Run `f`, moving the tracker to FAILED if it errors
    fn guarded<T>(&mut self, f: impl FnOnce(&mut Self) -> PipelineResult<T>) -> PipelineResult<T> {
        let result = f(self);
        if let Err(e) = &result {
            warn!("pipeline failed ({:?}): {}", e.kind(), e);
            self.tracker.fail(e.kind());
        }
        result
    }

    fn load(&mut self) -> PipelineResult<Manifest> {
        self.tracker.transition(PipelineState::Loading)?;
        Ok(load_manifest_file(&self.working_dir, &self.manifest_file)?)
    }

    fn package_loaded(&mut self, manifest: &Manifest) -> PipelineResult<Vec<PackagedComponent>> {
        self.tracker.transition(PipelineState::Validating)?;
        check_unique_ids(&manifest.components)?;

        let mut packaged = Vec::with_capacity(manifest.components.len());

        for (index, raw) in manifest.components.iter().enumerate() {
            if index > 0 {
                self.tracker.transition(PipelineState::Validating)?;
            }
            let component = validate_component(raw, &self.rules)?;

            self.tracker.transition(PipelineState::Verifying)?;
            let artifact = verify_build(&component, &self.working_dir)?;

            self.tracker.transition(PipelineState::Packaging)?;
            let build = self.packager.package(&artifact, component.title())?;

            let package = PackagedComponent::new(&component, build);
            info!(
                "component {} ({}) packaged: {} bytes, sha256 {}",
                package.title,
                package.id,
                package.size(),
                package.sha256
            );
            packaged.push(package);
        }

        self.tracker.transition(PipelineState::Done)?;
        Ok(packaged)
    }
}
