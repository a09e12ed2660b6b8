//! Event type definitions for structured pyembed events.
//!
//! Events are grouped by the phase of a run that produced them (install,
//! eviction, host interaction). Every event also carries the human-readable
//! line that renderers print verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A structured pyembed event with full metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolEvent {
    /// Unique event identifier.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The tracing target (e.g. "`pyembed::install`").
    pub target: String,
    /// How loud the event is.
    pub severity: Severity,
    /// The line shown to operators.
    pub message: String,
    /// The event category and data.
    pub category: EventCategory,
}

impl ToolEvent {
    /// Create a new event stamped with a fresh id and the current time.
    #[must_use]
    pub fn new(
        target: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        category: EventCategory,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            target: target.into(),
            severity,
            message: message.into(),
            category,
        }
    }
}

/// Event severity, derived from the tracing level the event was emitted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Diagnostic detail, hidden unless verbose.
    Debug,
    /// Operator-facing progress.
    Info,
    /// Recovered problem; the run continues.
    Warning,
    /// Terminal failure of the run.
    Error,
}

impl Severity {
    /// Map a tracing level onto a severity.
    #[must_use]
    pub fn from_level(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => Self::Error,
            tracing::Level::WARN => Self::Warning,
            tracing::Level::INFO => Self::Info,
            _ => Self::Debug,
        }
    }
}

/// Event categories organized by run phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EventCategory {
    /// Cache lookup and install pipeline events.
    Install(InstallEvent),
    /// Stale-version eviction events.
    Evict(EvictEvent),
    /// Interaction with the calling environment.
    Host(HostEvent),
}

/// Cache lookup and install pipeline events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum InstallEvent {
    /// A cache miss is about to be filled from the network.
    DownloadStarted {
        /// Tool identifier.
        tool: String,
        /// Requested version.
        version: String,
        /// Resolved architecture token.
        arch: String,
        /// Download URL.
        url: String,
    },
    /// A freshly downloaded artifact has been stored in the cache.
    Installed {
        /// Tool identifier.
        tool: String,
        /// Requested version.
        version: String,
        /// Resolved architecture token.
        arch: String,
        /// Final cached location.
        location: String,
    },
    /// The requested version was already cached.
    CacheHit {
        /// Tool identifier.
        tool: String,
        /// Requested version.
        version: String,
        /// Resolved architecture token.
        arch: String,
        /// Cached location.
        location: String,
    },
}

/// Stale-version eviction events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum EvictEvent {
    /// Removal of a stale version is starting.
    Started {
        /// Tool identifier.
        tool: String,
        /// Resolved architecture token.
        arch: String,
        /// Version being removed.
        version: String,
    },
    /// Removal of a stale version failed; the run continues.
    Failed {
        /// Tool identifier.
        tool: String,
        /// Resolved architecture token.
        arch: String,
        /// Version that could not be removed.
        version: String,
        /// Failure text.
        error: String,
    },
    /// The eviction pass finished.
    Completed {
        /// Tool identifier.
        tool: String,
        /// Resolved architecture token.
        arch: String,
        /// Number of versions removed.
        removed: u64,
        /// Number of versions whose removal failed.
        failed: u64,
    },
}

/// Interaction with the calling environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum HostEvent {
    /// The installed location was published to the caller.
    PathPublished {
        /// Published location.
        location: String,
    },
    /// The run ended with a terminal failure.
    RunFailed,
}
