//! Build artifact verification
//!
//! A component may ship a full static-site build (a directory) or a single
//! bundled script (a file):
//! - directory: must exist and contain at least one entry
//! - file: existence is enough

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::component::ValidatedComponent;

/// Shape of a build output on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Directory,
    File,
}

/// A build output that passed verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
    /// Absolute (working-directory-joined) path of the output
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

/// Errors for build artifact verification
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Component \"{title}\" path does not exist: {}. Make sure the path in the manifest is correct.", .path.display())]
    PathMissing { title: String, id: String, path: PathBuf },

    #[error("Component \"{title}\" <{id}> build at {} is empty. Run the component's build first.", .path.display())]
    BuildEmpty { title: String, id: String, path: PathBuf },

    #[error("failed to inspect build output {} of component \"{title}\": {source}", .path.display())]
    Inspect {
        title: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Resolve `component.path()` against `working_dir` and check it
pub fn verify_build(
    component: &ValidatedComponent,
    working_dir: &Path,
) -> Result<BuildArtifact, ArtifactError> {
    let path = working_dir.join(component.path());

    let metadata = match fs::metadata(&path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ArtifactError::PathMissing {
                title: component.title().to_string(),
                id: component.id().to_string(),
                path,
            });
        }
        Err(source) => {
            return Err(ArtifactError::Inspect {
                title: component.title().to_string(),
                path,
                source,
            });
        }
    };

    if !metadata.is_dir() {
        debug!("component {} build is a single file: {}", component.id(), path.display());
        return Ok(BuildArtifact {
            path,
            kind: ArtifactKind::File,
        });
    }

    let mut entries = fs::read_dir(&path).map_err(|source| ArtifactError::Inspect {
        title: component.title().to_string(),
        path: path.clone(),
        source,
    })?;

    if entries.next().is_none() {
        return Err(ArtifactError::BuildEmpty {
            title: component.title().to_string(),
            id: component.id().to_string(),
            path,
        });
    }

    debug!("component {} build directory verified: {}", component.id(), path.display());
    Ok(BuildArtifact {
        path,
        kind: ArtifactKind::Directory,
    })
}
