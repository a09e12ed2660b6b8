//! Structured event system for pyembed.
//!
//! Every operator-visible diagnostic produced by an install run is a tracing
//! event emitted through one of the `emit_*!` macros below. A custom tracing
//! Layer ([`ToolEventLayer`]) captures those events as typed [`ToolEvent`]s
//! and forwards them to a renderer (plain/annotated CLI output, or JSON lines).
//!
//! # Usage
//!
//! ```rust,ignore
//! use pyembed_events::{ToolEventLayer, emit_eviction_started};
//! use tracing_subscriber::layer::SubscriberExt;
//! use tracing_subscriber::util::SubscriberInitExt;
//!
//! let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
//! tracing_subscriber::registry()
//!     .with(ToolEventLayer::new(tx))
//!     .init();
//!
//! emit_eviction_started!("python-embedded", "amd64", "3.12.0",
//!     "Cleaning cached Python version: 3.12.0");
//! ```

pub mod event;
pub mod layer;
pub mod renderers;

pub use event::{EventCategory, EvictEvent, HostEvent, InstallEvent, Severity, ToolEvent};
pub use layer::ToolEventLayer;
pub use renderers::{CliRenderer, CliRendererConfig, JsonRenderer};

// ============================================================================
// Emit Macros
// ============================================================================

/// Emit a download started event (info).
///
/// # Example
/// ```rust,ignore
/// emit_download_started!("python-embedded", "3.14.0", "amd64", url, message);
/// ```
#[macro_export]
macro_rules! emit_download_started {
    ($tool:expr, $version:expr, $arch:expr, $url:expr, $message:expr) => {
        ::tracing::info!(
            target: "pyembed::install",
            event_type = "install.download_started",
            tool = %$tool,
            version = %$version,
            arch = %$arch,
            url = %$url,
            "{}",
            $message
        )
    };
}

/// Emit a tool installed event (info).
#[macro_export]
macro_rules! emit_tool_installed {
    ($tool:expr, $version:expr, $arch:expr, $location:expr, $message:expr) => {
        ::tracing::info!(
            target: "pyembed::install",
            event_type = "install.installed",
            tool = %$tool,
            version = %$version,
            arch = %$arch,
            location = %$location,
            "{}",
            $message
        )
    };
}

/// Emit a cache hit event (debug).
#[macro_export]
macro_rules! emit_cache_hit {
    ($tool:expr, $version:expr, $arch:expr, $location:expr) => {
        ::tracing::debug!(
            target: "pyembed::install",
            event_type = "install.cache_hit",
            tool = %$tool,
            version = %$version,
            arch = %$arch,
            location = %$location,
            "Found {} {} for {} in the tool cache at {}",
            $tool,
            $version,
            $arch,
            $location
        )
    };
}

/// Emit an eviction started event (info).
#[macro_export]
macro_rules! emit_eviction_started {
    ($tool:expr, $arch:expr, $version:expr, $message:expr) => {
        ::tracing::info!(
            target: "pyembed::evict",
            event_type = "evict.started",
            tool = %$tool,
            arch = %$arch,
            version = %$version,
            "{}",
            $message
        )
    };
}

/// Emit an eviction failed event (warning). Never terminal.
#[macro_export]
macro_rules! emit_eviction_failed {
    ($tool:expr, $arch:expr, $version:expr, $error:expr, $message:expr) => {
        ::tracing::warn!(
            target: "pyembed::evict",
            event_type = "evict.failed",
            tool = %$tool,
            arch = %$arch,
            version = %$version,
            error = %$error,
            "{}",
            $message
        )
    };
}

/// Emit an eviction completed event (debug).
#[macro_export]
macro_rules! emit_eviction_completed {
    ($tool:expr, $arch:expr, $removed:expr, $failed:expr) => {
        ::tracing::debug!(
            target: "pyembed::evict",
            event_type = "evict.completed",
            tool = %$tool,
            arch = %$arch,
            removed = $removed,
            failed = $failed,
            "Eviction finished: {} removed, {} failed",
            $removed,
            $failed
        )
    };
}

/// Emit a path published event (debug).
#[macro_export]
macro_rules! emit_path_published {
    ($location:expr) => {
        ::tracing::debug!(
            target: "pyembed::host",
            event_type = "host.path_published",
            location = %$location,
            "Published {}",
            $location
        )
    };
}

/// Emit a run failed event (error). The message is the run's failure reason.
#[macro_export]
macro_rules! emit_run_failed {
    ($message:expr) => {
        ::tracing::error!(
            target: "pyembed::host",
            event_type = "host.run_failed",
            "{}",
            $message
        )
    };
}
