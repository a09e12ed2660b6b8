use clap::Parser;
use miette::{Diagnostic, Report};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

use crate::tracing::LogLevel;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// Configuration error exit code (unsupported host, bad version, bad config)
pub const EXIT_CONFIG: i32 = 2;
/// Install or publish failure exit code
pub const EXIT_INSTALL: i32 = 3;
/// Exit code for SIGINT (128 + signal number 2)
pub const EXIT_SIGINT: i32 = 130;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// Configuration error (exit code 2)
    #[error("{message}")]
    #[diagnostic(code(pyembed::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Download, extract, cache store or publish failure (exit code 3)
    #[error("{message}")]
    #[diagnostic(code(pyembed::cli::install))]
    Install {
        /// The error message
        message: String,
    },
    /// Other unexpected error (exit code 3)
    #[error("Unexpected error: {message}")]
    #[diagnostic(code(pyembed::cli::other))]
    Other {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new install error
    #[must_use]
    pub fn install(message: impl Into<String>) -> Self {
        Self::Install {
            message: message.into(),
        }
    }

    /// Create a new other error
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new other error with help text
    #[must_use]
    pub fn other_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

/// Convert `pyembed_core::Error` to the matching `CliError` variant.
///
/// - unsupported OS, invalid version, unmapped architecture and bad
///   configuration -> Config (exit code 2)
/// - pipeline and publish failures -> Install (exit code 3)
/// - I/O errors -> Other (exit code 3)
impl From<pyembed_core::Error> for CliError {
    fn from(err: pyembed_core::Error) -> Self {
        use pyembed_core::Error;

        match err {
            Error::Configuration { message, help } => Self::Config { message, help },
            Error::UnsupportedOs
            | Error::InvalidVersion { .. }
            | Error::UnsupportedArchitecture { .. } => {
                let help = err.help().map(|h| h.to_string());
                Self::Config {
                    message: err.to_string(),
                    help,
                }
            }
            Error::Pipeline { message, .. } | Error::Publish { message } => Self::install(message),
            Error::Io {
                source,
                path,
                operation,
            } => {
                let path_str = path
                    .as_ref()
                    .map_or(String::new(), |p| format!(" on {}", p.display()));
                Self::other_with_help(
                    format!("I/O {operation} failed{path_str}: {source}"),
                    "Check file permissions and ensure the path exists",
                )
            }
        }
    }
}

/// Collaborator construction failures keep their own message (exit code 3).
impl From<pyembed_toolcache::Error> for CliError {
    fn from(err: pyembed_toolcache::Error) -> Self {
        Self::other(err.to_string())
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CONFIG,
        CliError::Install { .. } | CliError::Other { .. } => EXIT_INSTALL,
    }
}

/// Render error appropriately based on JSON flag
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        let error_envelope = ErrorEnvelope::new(serde_json::json!({
            "code": match err {
                CliError::Config { .. } => "config",
                CliError::Install { .. } => "install",
                CliError::Other { .. } => "other",
            },
            "message": err.to_string()
        }));

        match serde_json::to_string(&error_envelope) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        let report = Report::new(err.clone());
        eprintln!("{report:?}");
        let _ = io::stderr().flush();
    }
}

/// Success response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkEnvelope<T> {
    /// Status indicator - always "ok" for success
    pub status: &'static str,
    /// The actual data payload
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Create a new success envelope
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope<E> {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Install the Windows embeddable Python distribution into the runner tool cache.
///
/// The requested version is downloaded on a cache miss, every other cached
/// version for the same architecture is removed, and the installed directory
/// is added to the job's PATH.
#[derive(Parser, Debug)]
#[command(name = "pyembed")]
#[command(about = "Install the embeddable Python distribution into the runner tool cache")]
#[command(version)]
pub struct Cli {
    /// Exact Python version to install, e.g. 3.14.0.
    #[arg(
        long = "python-version",
        env = "INPUT_VERSION",
        value_name = "VERSION",
        help = "Exact Python version to install (full semantic version)"
    )]
    pub python_version: String,

    /// Host architecture token override.
    #[arg(
        long,
        value_name = "TOKEN",
        help = "Host architecture token (x64, arm64, x86); defaults to this machine"
    )]
    pub arch: Option<String>,

    /// Tool cache root override.
    #[arg(long, value_name = "PATH", help = "Tool cache root directory")]
    pub cache_dir: Option<PathBuf>,

    /// Scratch directory override.
    #[arg(long, value_name = "PATH", help = "Scratch directory for downloads")]
    pub temp_dir: Option<PathBuf>,

    /// Configuration file.
    #[arg(
        long,
        short = 'c',
        value_name = "PATH",
        env = "PYEMBED_CONFIG",
        help = "TOML configuration file"
    )]
    pub config: Option<PathBuf>,

    /// Report pipeline failures that carry no message.
    #[arg(long, help = "Fail the run on pipeline failures that carry no message")]
    pub report_opaque_failures: bool,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    /// Emit JSON events and envelopes.
    #[arg(long, help = "Emit JSON events and a JSON result envelope")]
    pub json: bool,

    /// Workflow-command annotations.
    #[arg(
        long,
        env = "GITHUB_ACTIONS",
        value_parser = clap::builder::FalseyValueParser::new(),
        help = "Write warnings and failures as workflow commands"
    )]
    pub annotations: bool,
}

/// Parse command line arguments
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
