//! Collaborator traits consumed by the installer.
//!
//! The installer owns no persistence. Everything it touches (the tool cache,
//! the network, archives, deletion, the calling environment) sits behind one
//! of these traits so hosts and tests can supply their own implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Failure;
use crate::platform::ResolvedArch;
use crate::version::RequestedVersion;

/// An opaque location handed back by a collaborator.
///
/// The installer never parses it; it only passes it along.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactLocation(String);

impl ArtifactLocation {
    /// Wrap a location string.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    /// The location as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The location as a filesystem path, for collaborators that use paths.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for ArtifactLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PathBuf> for ArtifactLocation {
    fn from(path: PathBuf) -> Self {
        Self(path.to_string_lossy().into_owned())
    }
}

impl From<&Path> for ArtifactLocation {
    fn from(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }
}

/// The (tool, version, architecture) triple used for every cache read and write.
///
/// Only constructible from an already validated version and a resolved
/// architecture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    tool: String,
    version: RequestedVersion,
    arch: ResolvedArch,
}

impl CacheKey {
    /// Build a key.
    #[must_use]
    pub fn new(tool: impl Into<String>, version: RequestedVersion, arch: ResolvedArch) -> Self {
        Self {
            tool: tool.into(),
            version,
            arch,
        }
    }

    /// Tool identifier.
    #[must_use]
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Requested version.
    #[must_use]
    pub fn version(&self) -> &RequestedVersion {
        &self.version
    }

    /// Resolved architecture.
    #[must_use]
    pub const fn arch(&self) -> ResolvedArch {
        self.arch
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}-{}", self.tool, self.version, self.arch)
    }
}

/// Versioned key-value store of installed tool trees.
#[async_trait]
pub trait ToolCache: Send + Sync {
    /// Look up a complete entry. `None` is a cache miss.
    fn find(&self, tool: &str, version: &str, arch: ResolvedArch) -> Option<ArtifactLocation>;

    /// Every cached version of `tool` for `arch`. Other architectures are
    /// never included; an empty list is normal.
    fn find_all_versions(&self, tool: &str, arch: ResolvedArch) -> Vec<String>;

    /// Where the entry for (tool, version, arch) lives, whether or not it exists.
    fn entry_location(&self, tool: &str, version: &str, arch: ResolvedArch) -> ArtifactLocation;

    /// Store an extracted tree and return its final cached location.
    ///
    /// # Errors
    ///
    /// Returns a [`Failure`] when the tree cannot be stored.
    async fn cache_dir(
        &self,
        source: &ArtifactLocation,
        tool: &str,
        version: &str,
        arch: ResolvedArch,
    ) -> Result<ArtifactLocation, Failure>;
}

/// Fetches a URL to a local location.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download `url` and return where the bytes were written.
    ///
    /// # Errors
    ///
    /// Returns a [`Failure`] on any network or write problem.
    async fn download(&self, url: &str) -> Result<ArtifactLocation, Failure>;
}

/// Unpacks a downloaded archive.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract `archive` and return the directory holding its contents.
    ///
    /// # Errors
    ///
    /// Returns a [`Failure`] when the archive is unreadable or cannot be written out.
    async fn extract(&self, archive: &ArtifactLocation) -> Result<ArtifactLocation, Failure>;
}

/// Recursive delete primitive.
#[async_trait]
pub trait Remover: Send + Sync {
    /// Remove `location` and everything under it. A missing location is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`Failure`] when something exists but cannot be removed.
    async fn remove_recursive(&self, location: &ArtifactLocation) -> Result<(), Failure>;
}

/// The calling environment.
pub trait Host: Send + Sync {
    /// Record the run's terminal failure.
    fn report_failure(&self, message: &str);

    /// Make the installed location available to downstream consumers.
    ///
    /// # Errors
    ///
    /// Returns a [`Failure`] when the location cannot be published.
    fn publish_path(&self, location: &ArtifactLocation) -> Result<(), Failure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_round_trip() {
        let location = ArtifactLocation::new("/cache/python-embedded/3.14.0/amd64");
        assert_eq!(location.as_str(), "/cache/python-embedded/3.14.0/amd64");
        assert_eq!(
            location.as_path(),
            Path::new("/cache/python-embedded/3.14.0/amd64")
        );
        assert_eq!(location.to_string(), location.as_str());
    }

    #[test]
    fn test_location_from_path() {
        let location = ArtifactLocation::from(PathBuf::from("/tmp/x"));
        assert_eq!(location.as_str(), "/tmp/x");
    }

    #[test]
    fn test_location_serializes_as_string() {
        let json = serde_json::to_string(&ArtifactLocation::new("/a/b")).unwrap();
        assert_eq!(json, "\"/a/b\"");
    }

    #[test]
    fn test_cache_key_accessors() {
        let key = CacheKey::new(
            "python-embedded",
            RequestedVersion::parse("3.14.0").unwrap(),
            ResolvedArch::Arm64,
        );
        assert_eq!(key.tool(), "python-embedded");
        assert_eq!(key.version().as_str(), "3.14.0");
        assert_eq!(key.arch(), ResolvedArch::Arm64);
        assert_eq!(key.to_string(), "python-embedded@3.14.0-arm64");
    }
}
