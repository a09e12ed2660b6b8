//! Core of the pyembed installer.
//!
//! Given a raw version string and a description of the host, an
//! [`Installer`] makes that version of the embeddable Python distribution
//! available from a versioned tool cache:
//!
//! 1. the host OS, the version string and the host architecture are checked;
//! 2. the cache is consulted and, on a miss, the archive is downloaded,
//!    extracted and stored;
//! 3. every other cached version for the same architecture is evicted;
//! 4. the installed location is published to the caller.
//!
//! All I/O goes through the collaborator traits in [`provider`]; concrete
//! implementations live in `pyembed-toolcache`.

pub mod config;
pub mod error;
pub mod evict;
pub mod installer;
pub mod pipeline;
pub mod platform;
pub mod provider;
pub mod version;

#[cfg(test)]
mod test_utils;

pub use config::{InstallerConfig, ToolSpec};
pub use error::{Error, Failure, PipelineStage, Result};
pub use evict::{EvictionReport, evict_stale};
pub use installer::{Collaborators, Installer, RunOutcome};
pub use pipeline::{Installation, PipelineContext, PipelineError, install_or_fetch};
pub use platform::{PlatformSpec, ResolvedArch};
pub use provider::{ArtifactLocation, CacheKey, Downloader, Extractor, Host, Remover, ToolCache};
pub use version::{InvalidVersion, RequestedVersion};
