//! Per-request scratch directory. Dropping it removes every file it holds.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Creates a uniquely named directory under `parent`.
    pub fn create(parent: &Path) -> Result<Self> {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating work dir {}", parent.display()))?;
        let dir = tempfile::Builder::new()
            .prefix("cdbg-")
            .tempdir_in(parent)
            .with_context(|| format!("creating scratch dir in {}", parent.display()))?;
        log::debug!("scratch dir {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub async fn write_source(&self, file_name: &str, source: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(file_name);
        tokio::fs::write(&path, source)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    pub fn artifact_path(&self, stem: &str) -> PathBuf {
        let name = if cfg!(windows) { format!("{stem}.exe") } else { stem.to_string() };
        self.dir.path().join(name)
    }
}
