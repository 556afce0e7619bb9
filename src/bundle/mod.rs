//! Component packaging
//!
//! Compresses a verified build output into an in-memory tar.gz. All work
//! happens inside a fresh scratch directory that is removed before
//! [`Packager::package`] returns, on success and on failure.

mod archive;
mod scratch;

pub use archive::{write_tar_gz, ArchiveError};
pub use scratch::ScratchDir;

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::artifact::{ArtifactKind, BuildArtifact};
use crate::config::PackConfig;

/// Subdirectory a single-file build is copied into before archiving
const SINGLE_FILE_ROOT: &str = "build";

/// Errors for packaging operations
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("Packaging component \"{title}\" failed: {source}")]
    PackagingFailed {
        title: String,
        #[source]
        source: ArchiveError,
    },
}

/// Packages build outputs into tar.gz bytes
#[derive(Debug, Clone)]
pub struct Packager {
    /// Parent of every scratch directory
    scratch_root: PathBuf,
    /// Scratch directory name prefix
    prefix: String,
}

impl Packager {
    pub fn new(scratch_root: PathBuf, prefix: impl Into<String>) -> Self {
        Self {
            scratch_root,
            prefix: prefix.into(),
        }
    }

    pub fn from_config(config: &PackConfig) -> Self {
        Self::new(config.scratch_root(), config.scratch_prefix.clone())
    }

    pub fn scratch_root(&self) -> &Path {
        &self.scratch_root
    }

    /// Archive `artifact` and return the compressed bytes
    ///
    /// A directory is archived with paths relative to itself. A single file
    /// is first copied into an empty subdirectory so both shapes produce
    /// the same single-root layout.
    pub fn package(&self, artifact: &BuildArtifact, title: &str) -> Result<Vec<u8>, BundleError> {
        let failed = |source: ArchiveError| BundleError::PackagingFailed {
            title: title.to_string(),
            source,
        };

        let scratch = ScratchDir::create(&self.scratch_root, &self.prefix)
            .map_err(|e| failed(e.into()))?;

        let result = build_archive(scratch.path(), artifact, title);
        let cleanup = scratch.close();

        match (result, cleanup) {
            (Ok(bytes), Ok(())) => Ok(bytes),
            (Ok(_), Err(e)) => Err(failed(e.into())),
            (Err(e), cleanup) => {
                if let Err(cleanup_err) = cleanup {
                    warn!("failed to remove scratch directory for {}: {}", title, cleanup_err);
                }
                Err(failed(e))
            }
        }
    }
}

fn build_archive(
    scratch: &Path,
    artifact: &BuildArtifact,
    title: &str,
) -> Result<Vec<u8>, ArchiveError> {
    let archive_path = scratch.join(archive_file_name(title));

    let source_root = match artifact.kind {
        ArtifactKind::Directory => artifact.path.clone(),
        ArtifactKind::File => {
            let build_dir = scratch.join(SINGLE_FILE_ROOT);
            fs::create_dir(&build_dir)?;
            let file_name = artifact
                .path
                .file_name()
                .ok_or_else(|| ArchiveError::PathNotInRoot(artifact.path.clone()))?;
            fs::copy(&artifact.path, build_dir.join(file_name))?;
            build_dir
        }
    };

    let entries = write_tar_gz(&source_root, &archive_path)?;
    let bytes = fs::read(&archive_path)?;

    info!(
        "packaged {} ({} entries, {:.2} KB)",
        title,
        entries,
        bytes.len() as f64 / 1024.0
    );
    Ok(bytes)
}

/// `<title>.tar.gz` with anything outside `[A-Za-z0-9._-]` replaced
pub(crate) fn archive_file_name(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_start_matches('.');
    if stem.is_empty() {
        "component.tar.gz".to_string()
    } else {
        format!("{}.tar.gz", stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::collections::BTreeMap;
    use std::io::Read;
    use tempfile::TempDir;

    /// Decompress archive bytes into path -> contents for regular files
    fn unpack(bytes: &[u8]) -> BTreeMap<String, Vec<u8>> {
        let mut archive = tar::Archive::new(GzDecoder::new(bytes));
        let mut files = BTreeMap::new();
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            if entry.header().entry_type() != tar::EntryType::Regular {
                continue;
            }
            let path = entry.path().unwrap().to_string_lossy().to_string();
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents).unwrap();
            files.insert(path, contents);
        }
        files
    }

    fn packager(root: &TempDir) -> Packager {
        Packager::new(root.path().to_path_buf(), "fireberry-")
    }

    fn scratch_leftovers(root: &TempDir) -> usize {
        fs::read_dir(root.path()).unwrap().count()
    }

    #[test]
    fn test_directory_round_trip() {
        let src = TempDir::new().unwrap();
        let scratch_root = TempDir::new().unwrap();
        fs::write(src.path().join("a.txt"), "alpha").unwrap();
        fs::create_dir(src.path().join("b")).unwrap();
        fs::write(src.path().join("b/c.txt"), "charlie").unwrap();

        let artifact = BuildArtifact {
            path: src.path().to_path_buf(),
            kind: ArtifactKind::Directory,
        };
        let bytes = packager(&scratch_root).package(&artifact, "Orders").unwrap();

        let files = unpack(&bytes);
        assert_eq!(files.len(), 2);
        assert_eq!(files["a.txt"], b"alpha");
        assert_eq!(files["b/c.txt"], b"charlie");
        assert_eq!(scratch_leftovers(&scratch_root), 0);
    }

    #[test]
    fn test_single_file_layout() {
        let src = TempDir::new().unwrap();
        let scratch_root = TempDir::new().unwrap();
        let script = src.path().join("bundle.js");
        fs::write(&script, "export default 1;").unwrap();

        let artifact = BuildArtifact {
            path: script,
            kind: ArtifactKind::File,
        };
        let bytes = packager(&scratch_root).package(&artifact, "Script").unwrap();

        let files = unpack(&bytes);
        assert_eq!(files.keys().collect::<Vec<_>>(), vec!["bundle.js"]);
        assert_eq!(files["bundle.js"], b"export default 1;");
        assert_eq!(scratch_leftovers(&scratch_root), 0);
    }

    #[test]
    fn test_failure_still_cleans_up() {
        let src = TempDir::new().unwrap();
        let scratch_root = TempDir::new().unwrap();

        let artifact = BuildArtifact {
            path: src.path().join("vanished"),
            kind: ArtifactKind::Directory,
        };
        let err = packager(&scratch_root).package(&artifact, "Gone").unwrap_err();

        let BundleError::PackagingFailed { title, .. } = err;
        assert_eq!(title, "Gone");
        assert_eq!(scratch_leftovers(&scratch_root), 0);
    }

    #[test]
    fn test_missing_scratch_root_is_packaging_failure() {
        let src = TempDir::new().unwrap();
        fs::write(src.path().join("a.txt"), "a").unwrap();
        let scratch_root = TempDir::new().unwrap();

        let packager = Packager::new(scratch_root.path().join("nope"), "fireberry-");
        let artifact = BuildArtifact {
            path: src.path().to_path_buf(),
            kind: ArtifactKind::Directory,
        };
        assert!(packager.package(&artifact, "Orders").is_err());
    }

    #[test]
    fn test_same_build_same_bytes() {
        let src = TempDir::new().unwrap();
        let scratch_root = TempDir::new().unwrap();
        fs::write(src.path().join("index.html"), "<html></html>").unwrap();

        let artifact = BuildArtifact {
            path: src.path().to_path_buf(),
            kind: ArtifactKind::Directory,
        };
        let packager = packager(&scratch_root);
        let first = packager.package(&artifact, "A").unwrap();
        let second = packager.package(&artifact, "B").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_archive_file_name_sanitized() {
        assert_eq!(archive_file_name("Orders"), "Orders.tar.gz");
        assert_eq!(archive_file_name("my/comp name"), "my_comp_name.tar.gz");
        assert_eq!(archive_file_name("../x"), "_x.tar.gz");
        assert_eq!(archive_file_name(""), "component.tar.gz");
    }
}
