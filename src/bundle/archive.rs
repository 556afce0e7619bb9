//! Canonical tar.gz writer
//!
//! Entries are written in sorted path order with normalized metadata
//! (mtime 0, uid/gid 0, mode 0644 or 0755), so identical build output
//! produces identical archive bytes.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use tar::{Builder, EntryType, Header};
use walkdir::WalkDir;

/// Errors while writing an archive
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("symlink escapes build root: {}", .path.display())]
    SymlinkEscapesRoot { path: PathBuf },

    #[error("path is not within build root: {}", .0.display())]
    PathNotInRoot(PathBuf),
}

/// Archive everything below `root` into a gzip-compressed tar at `output`
///
/// Entry paths are relative to `root`; `root` itself is not an entry.
/// Returns the number of entries written.
pub fn write_tar_gz(root: &Path, output: &Path) -> Result<usize, ArchiveError> {
    let file = File::create(output)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = Builder::new(encoder);
    builder.follow_symlinks(false);

    let canonical_root = root.canonicalize()?;
    let mut count = 0;

    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
    {
        let entry = entry?;
        let path = entry.path();

        let rel_path = path
            .strip_prefix(root)
            .map_err(|_| ArchiveError::PathNotInRoot(path.to_path_buf()))?;

        if rel_path.as_os_str().is_empty() {
            continue;
        }

        let file_type = entry.file_type();
        let mut header = Header::new_gnu();
        header.set_mtime(0);
        header.set_uid(0);
        header.set_gid(0);

        if file_type.is_symlink() {
            let target = fs::read_link(path)?;
            let resolved = if target.is_absolute() {
                target.clone()
            } else {
                let link_dir = rel_path.parent().unwrap_or(Path::new(""));
                canonical_root.join(link_dir).join(&target)
            };
            // Dangling targets cannot be canonicalized; fold `..` by hand.
            let canonical = resolved
                .canonicalize()
                .unwrap_or_else(|_| normalize_lexically(&resolved));
            if !canonical.starts_with(&canonical_root) {
                return Err(ArchiveError::SymlinkEscapesRoot {
                    path: path.to_path_buf(),
                });
            }

            header.set_entry_type(EntryType::Symlink);
            header.set_mode(0o777);
            header.set_size(0);
            builder.append_link(&mut header, rel_path, &target)?;
        } else if file_type.is_dir() {
            header.set_entry_type(EntryType::Directory);
            header.set_mode(0o755);
            header.set_size(0);
            builder.append_data(&mut header, rel_path, io::empty())?;
        } else {
            let contents = fs::read(path)?;
            header.set_entry_type(EntryType::Regular);
            header.set_mode(if is_executable(path) { 0o755 } else { 0o644 });
            header.set_size(contents.len() as u64);
            builder.append_data(&mut header, rel_path, contents.as_slice())?;
        }

        count += 1;
    }

    let encoder = builder.into_inner()?;
    encoder.finish()?;
    Ok(count)
}

/// Resolve `.` and `..` components without touching the filesystem
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = fs::metadata(path) {
            return metadata.permissions().mode() & 0o111 != 0;
        }
    }
    false
}
