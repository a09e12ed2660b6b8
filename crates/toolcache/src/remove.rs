//! Recursive removal with rm -rf semantics.

use async_trait::async_trait;
use pyembed_core::{ArtifactLocation, Failure, Remover};
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

use crate::Result;

/// Removes files and directory trees; a missing path counts as removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRemover;

impl FsRemover {
    /// Create a remover.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Remove `path` and everything under it.
    pub async fn remove(&self, path: &Path) -> Result<()> {
        let metadata = match tokio::fs::symlink_metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(?path, "Nothing to remove");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let result = if metadata.is_dir() {
            tokio::fs::remove_dir_all(path).await
        } else {
            tokio::fs::remove_file(path).await
        };

        match result {
            Ok(()) => {
                debug!(?path, "Removed");
                Ok(())
            }
            // Raced with another remover
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Remover for FsRemover {
    async fn remove_recursive(&self, location: &ArtifactLocation) -> std::result::Result<(), Failure> {
        Ok(self.remove(location.as_path()).await?)
    }
}
