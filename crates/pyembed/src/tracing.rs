//! Tracing configuration for the pyembed CLI
//!
//! Two layers are installed on one registry:
//! - a [`ToolEventLayer`] that turns `pyembed::*` events into [`ToolEvent`]s
//!   for the renderer;
//! - a diagnostic `fmt` layer on stderr for everything else, filtered by
//!   `RUST_LOG` or the `--level` flag.

use std::io;
pub use tracing::Level;
use tracing_subscriber::filter::{EnvFilter, FilterExt, LevelFilter, Targets, filter_fn};
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

use pyembed_events::{ToolEvent, ToolEventLayer};
use tokio::sync::mpsc;

/// Target prefix shared by every structured event.
pub const EVENT_TARGET_PREFIX: &str = "pyembed::";

/// Diagnostic output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Compact single-line format
    Compact,
    /// Structured JSON format
    Json,
}

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Show all logs (trace level)
    Trace,
    /// Show debug and above
    Debug,
    /// Show info and above
    Info,
    /// Show warnings and above (default)
    Warn,
    /// Show errors only
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

/// Tracing configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Diagnostic output format.
    pub format: TracingFormat,
    /// Diagnostic level when `RUST_LOG` is unset.
    pub level: Level,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            format: TracingFormat::Compact,
            level: Level::WARN,
        }
    }
}

impl TracingConfig {
    /// Whether debug-severity structured events should reach the renderer.
    #[must_use]
    pub fn verbose(&self) -> bool {
        self.level >= Level::DEBUG
    }

    /// Filter for the structured event layer.
    ///
    /// Info and above always flow; debug events only in verbose mode.
    #[must_use]
    pub fn event_filter(&self) -> Targets {
        let level = if self.verbose() {
            LevelFilter::TRACE
        } else {
            LevelFilter::INFO
        };
        Targets::new().with_target("pyembed", level)
    }

    /// Filter for the diagnostic `fmt` layer.
    ///
    /// `RUST_LOG` wins; an unset or unparsable value falls back to `level`.
    pub fn diagnostic_filter(&self) -> miette::Result<EnvFilter> {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level_directive(self.level)))
            .map_err(|e| miette::miette!("Failed to create tracing filter: {e}"))
    }
}

fn level_directive(level: Level) -> String {
    let level_str = match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    };
    format!(
        "pyembed_cli={level_str},pyembed_core={level_str},pyembed_toolcache={level_str},pyembed_events={level_str}"
    )
}

/// Whether a target belongs to the structured event stream.
#[must_use]
pub fn is_event_target(target: &str) -> bool {
    target.starts_with(EVENT_TARGET_PREFIX)
}

/// Initialize tracing and return the receiving end of the event stream.
pub fn init_tracing_with_events(
    config: &TracingConfig,
) -> miette::Result<mpsc::UnboundedReceiver<ToolEvent>> {
    let (sender, receiver) = mpsc::unbounded_channel();

    let events = ToolEventLayer::new(sender).with_filter(config.event_filter());
    let diagnostics_filter = config
        .diagnostic_filter()?
        .and(filter_fn(|meta| !is_event_target(meta.target())));

    let registry = tracing_subscriber::registry().with(events);

    match config.format {
        TracingFormat::Compact => {
            let layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(io::stderr)
                .with_target(true)
                .with_filter(diagnostics_filter);
            registry
                .with(layer)
                .try_init()
                .map_err(|e| miette::miette!("Failed to initialize tracing: {e}"))?;
        }
        TracingFormat::Json => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_current_span(true)
                .with_filter(diagnostics_filter);
            registry
                .with(layer)
                .try_init()
                .map_err(|e| miette::miette!("Failed to initialize tracing: {e}"))?;
        }
    }

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        format = ?config.format,
        "Tracing initialized for pyembed"
    );

    Ok(receiver)
}
