//! Requested-version validation.

use serde::Serialize;
use std::fmt;

/// A version string that passed full semantic-version validation.
///
/// The original text is kept exactly as supplied; it is what cache keys,
/// download URLs and eviction comparisons use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RequestedVersion {
    raw: String,
    #[serde(skip)]
    parsed: semver::Version,
}

impl RequestedVersion {
    /// Validate `raw` against the semantic-versioning grammar.
    ///
    /// No trimming, prefix stripping or other repair is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidVersion`] carrying `raw` verbatim.
    pub fn parse(raw: &str) -> Result<Self, InvalidVersion> {
        semver::Version::parse(raw)
            .map(|parsed| Self {
                raw: raw.to_string(),
                parsed,
            })
            .map_err(|_| InvalidVersion {
                raw: raw.to_string(),
            })
    }

    /// The version exactly as supplied.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed semantic version.
    #[must_use]
    pub fn semver(&self) -> &semver::Version {
        &self.parsed
    }
}

impl fmt::Display for RequestedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl AsRef<str> for RequestedVersion {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

/// Rejection signal for a version string that is not a semantic version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidVersion {
    /// The rejected input, unmodified.
    pub raw: String,
}

/// Validate a raw version string.
///
/// # Errors
///
/// Returns [`InvalidVersion`] when `raw` is not a semantic version.
pub fn validate(raw: &str) -> Result<RequestedVersion, InvalidVersion> {
    RequestedVersion::parse(raw)
}
