//! Scratch directories
//!
//! Each packaging step owns one uniquely named directory under the scratch
//! root. It is removed by [`ScratchDir::close`] on normal paths and by
//! `Drop` if the step unwinds.

use std::io;
use std::path::Path;
use tempfile::TempDir;
use tracing::debug;

/// Exclusively owned temporary workspace for one packaging step
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create `<root>/<prefix><random>`
    pub fn create(root: &Path, prefix: &str) -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix(prefix).tempdir_in(root)?;
        debug!("created scratch directory {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory and everything in it
    pub fn close(self) -> io::Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!("removed scratch directory {}", path.display());
        Ok(())
    }
}
