//! Fireberry app packaging
//!
//! This crate validates the components declared in an app's `manifest.yml`
//! and packages each component's build output into a compressed archive,
//! ready to be pushed to the Fireberry registry.

pub mod artifact;
pub mod bundle;
pub mod component;
pub mod config;
pub mod debug;
pub mod manifest;
pub mod pipeline;
pub mod state;
pub mod summary;
pub mod transport;

pub use artifact::{verify_build, ArtifactError, ArtifactKind, BuildArtifact};
pub use bundle::{BundleError, Packager};
pub use component::{
    check_unique_ids, validate_component, ComponentError, ComponentSettings, ComponentType,
    SchemaRules, ValidatedComponent,
};
pub use config::{ConfigError, EffectiveConfig, PackConfig};
pub use manifest::{load_manifest, Manifest, ManifestError, NewComponent, RawComponent};
pub use pipeline::{
    ErrorKind, PackOutcome, PackagedComponent, Pipeline, PipelineError, PipelineResult,
    VerifiedComponent,
};
pub use state::{PipelineState, StateTracker};
pub use summary::PackSummary;
pub use transport::{CredentialStore, DirectoryRegistry, Registry};
