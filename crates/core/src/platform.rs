//! Host platform description and architecture resolution.
//!
//! Handles mapping between:
//! - raw host architecture tokens (`x64`, `arm64`, `x86`)
//! - the distribution's artifact tokens (`amd64`, `arm64`, `win32`), which are
//!   also the architecture component of every cache key

use serde::{Deserialize, Serialize};
use std::fmt;

/// The single operating system artifacts are published for.
pub const SUPPORTED_OS: &str = "windows";

/// Description of the host, read once at start-up and passed in explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformSpec {
    /// Whether the host OS is [`SUPPORTED_OS`].
    pub os_supported: bool,
    /// Raw host architecture token, e.g. `x64`.
    pub arch_token: String,
}

impl PlatformSpec {
    /// Create a platform description.
    #[must_use]
    pub fn new(os_supported: bool, arch_token: impl Into<String>) -> Self {
        Self {
            os_supported,
            arch_token: arch_token.into(),
        }
    }

    /// Describe the current host.
    #[must_use]
    pub fn current() -> Self {
        Self::new(
            std::env::consts::OS == SUPPORTED_OS,
            host_arch_token(std::env::consts::ARCH),
        )
    }

    /// Replace the architecture token, keeping the OS flag.
    #[must_use]
    pub fn with_arch_token(mut self, token: impl Into<String>) -> Self {
        self.arch_token = token.into();
        self
    }

    /// Resolve this host's architecture token.
    #[must_use]
    pub fn resolve(&self) -> Option<ResolvedArch> {
        resolve(&self.arch_token)
    }
}

/// Translate a Rust target architecture name into the host token vocabulary.
///
/// Unknown names pass through unchanged so diagnostics can show them.
#[must_use]
pub fn host_arch_token(rust_arch: &str) -> String {
    match rust_arch {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        "x86" => "x86",
        other => other,
    }
    .to_string()
}

/// Canonical architecture used in download URLs and cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedArch {
    /// 64-bit x86 (`x64`).
    Amd64,
    /// 64-bit ARM (`arm64`).
    Arm64,
    /// 32-bit x86 (`x86`).
    Win32,
}

impl ResolvedArch {
    /// Every resolvable architecture.
    pub const ALL: [Self; 3] = [Self::Amd64, Self::Arm64, Self::Win32];

    /// The artifact token for this architecture.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
            Self::Win32 => "win32",
        }
    }

    /// The host token that maps to this architecture.
    #[must_use]
    pub const fn host_token(self) -> &'static str {
        match self {
            Self::Amd64 => "x64",
            Self::Arm64 => "arm64",
            Self::Win32 => "x86",
        }
    }
}

impl fmt::Display for ResolvedArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a raw host architecture token to its artifact token.
///
/// The table is exact and case-sensitive. Tokens outside it yield `None`
/// so the caller can report the raw token rather than a resolved one.
#[must_use]
pub fn resolve(arch_token: &str) -> Option<ResolvedArch> {
    match arch_token {
        "x64" => Some(ResolvedArch::Amd64),
        "arm64" => Some(ResolvedArch::Arm64),
        "x86" => Some(ResolvedArch::Win32),
        _ => None,
    }
}
