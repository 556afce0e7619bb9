//! Build artifacts
//!
//! Confirms each component's declared build output exists before it is
//! handed to the packager.

mod verify;

pub use verify::{verify_build, ArtifactError, ArtifactKind, BuildArtifact};
