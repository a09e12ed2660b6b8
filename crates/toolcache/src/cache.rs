//! Versioned filesystem tool cache.

use async_trait::async_trait;
use pyembed_core::{ArtifactLocation, Failure, ResolvedArch, ToolCache};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::{Error, Result};

/// Name of the marker file that makes an entry visible.
pub const COMPLETE_MARKER: &str = ".complete";

/// Versioned tool cache on the local filesystem.
///
/// Structure:
/// ```text
/// <root>/
/// └── python-embedded/
///     ├── 3.13.1/
///     │   └── amd64/
///     │       ├── .complete   # written last
///     │       └── python.exe
///     └── 3.14.0/
///         └── arm64/
/// ```
///
/// An entry without its marker is treated as absent, so an interrupted store
/// is never returned as a hit.
#[derive(Debug, Clone)]
pub struct FsToolCache {
    root: PathBuf,
}

impl FsToolCache {
    /// Create a cache at the specified root directory.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Get the cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one (tool, version, arch) entry.
    pub fn entry_dir(&self, tool: &str, version: &str, arch: ResolvedArch) -> Result<PathBuf> {
        Ok(self
            .root
            .join(component(tool)?)
            .join(component(version)?)
            .join(arch.as_str()))
    }

    /// Whether the entry exists and finished storing.
    #[must_use]
    pub fn is_complete(&self, tool: &str, version: &str, arch: ResolvedArch) -> bool {
        self.entry_dir(tool, version, arch)
            .is_ok_and(|dir| dir.join(COMPLETE_MARKER).is_file())
    }

    fn store(&self, source: &Path, tool: &str, version: &str, arch: ResolvedArch) -> Result<PathBuf> {
        let dest = self.entry_dir(tool, version, arch)?;
        if !source.is_dir() {
            return Err(Error::MissingSource(source.to_path_buf()));
        }

        if dest.exists() {
            debug!(?dest, "Replacing existing cache entry");
            std::fs::remove_dir_all(&dest)?;
        }
        std::fs::create_dir_all(&dest)?;

        copy_tree(source, &dest)?;
        std::fs::write(dest.join(COMPLETE_MARKER), b"")?;

        debug!(tool, version, %arch, ?dest, "Stored entry in tool cache");
        Ok(dest)
    }
}

#[async_trait]
impl ToolCache for FsToolCache {
    fn find(&self, tool: &str, version: &str, arch: ResolvedArch) -> Option<ArtifactLocation> {
        let dir = self.entry_dir(tool, version, arch).ok()?;
        if dir.join(COMPLETE_MARKER).is_file() {
            trace!(tool, version, %arch, ?dir, "Cache hit");
            Some(dir.into())
        } else {
            trace!(tool, version, %arch, "Cache miss");
            None
        }
    }

    fn find_all_versions(&self, tool: &str, arch: ResolvedArch) -> Vec<String> {
        let Ok(tool_dir) = component(tool).map(|t| self.root.join(t)) else {
            return Vec::new();
        };
        let Ok(entries) = std::fs::read_dir(&tool_dir) else {
            return Vec::new();
        };

        let mut versions: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|version| self.is_complete(tool, version, arch))
            .collect();
        versions.sort();
        versions
    }

    fn entry_location(&self, tool: &str, version: &str, arch: ResolvedArch) -> ArtifactLocation {
        // Eviction only passes versions enumerated by find_all_versions, which are valid components.
        self.entry_dir(tool, version, arch)
            .unwrap_or_else(|_| self.root.join(tool).join(version).join(arch.as_str()))
            .into()
    }

    async fn cache_dir(
        &self,
        source: &ArtifactLocation,
        tool: &str,
        version: &str,
        arch: ResolvedArch,
    ) -> std::result::Result<ArtifactLocation, Failure> {
        let cache = self.clone();
        let source = source.as_path().to_path_buf();
        let (tool, version) = (tool.to_string(), version.to_string());

        let stored = tokio::task::spawn_blocking(move || cache.store(&source, &tool, &version, arch))
            .await
            .map_err(Error::from)??;
        Ok(stored.into())
    }
}

/// Reject empty components and anything that is not a single path segment.
fn component(value: &str) -> Result<&str> {
    let invalid = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\'])
        || value.trim() != value;
    if invalid {
        Err(Error::invalid_component(value))
    } else {
        Ok(value)
    }
}

/// Recursively copy the contents of `source` into `dest`.
fn copy_tree(source: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
