//! Error types for pyembed-core.
//!
//! Three families of failure exist:
//! - configuration errors (unsupported OS, bad version, unmapped architecture),
//!   always terminal;
//! - pipeline errors (download, extract, cache store), terminal when they carry
//!   a message;
//! - collaborator [`Failure`]s, the raw tagged value every external
//!   collaborator returns.

use miette::Diagnostic;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for pyembed-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fixed message reported when the host OS is not supported.
pub const UNSUPPORTED_OS_MESSAGE: &str = "This action only supports Windows runners.";

/// Main error type for pyembed-core operations.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The host operating system is not the supported one.
    #[error("This action only supports Windows runners.")]
    #[diagnostic(
        code(pyembed::config::unsupported_os),
        help("Run this step on a Windows runner")
    )]
    UnsupportedOs,

    /// The requested version is not a valid semantic version.
    #[error("Invalid {display_name} version input: {raw}")]
    #[diagnostic(
        code(pyembed::config::invalid_version),
        help("Versions must be full semantic versions such as 3.14.0")
    )]
    InvalidVersion {
        /// Human name of the tool, used in the message.
        display_name: String,
        /// The version string exactly as supplied.
        raw: String,
    },

    /// The host architecture token has no mapping.
    #[error("Unsupported architecture: {token}")]
    #[diagnostic(
        code(pyembed::config::unsupported_arch),
        help("Supported architectures are x64, arm64 and x86")
    )]
    UnsupportedArchitecture {
        /// The raw, unmapped host token.
        token: String,
    },

    /// A download, extract or cache-store step failed.
    ///
    /// The message is the collaborator's message, verbatim.
    #[error("{message}")]
    #[diagnostic(code(pyembed::install::pipeline))]
    Pipeline {
        /// The step that failed.
        stage: PipelineStage,
        /// The failure message.
        message: String,
    },

    /// The installed location could not be published to the caller.
    #[error("{message}")]
    #[diagnostic(code(pyembed::host::publish))]
    Publish {
        /// The failure message.
        message: String,
    },

    /// Invalid installer configuration.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(pyembed::config::invalid))]
    Configuration {
        /// What is wrong.
        message: String,
        /// Optional hint.
        #[help]
        help: Option<String>,
    },

    /// I/O error with path context
    #[error("I/O error during {operation}: {source}")]
    #[diagnostic(code(pyembed::io::error))]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// The path where the I/O error occurred, if applicable
        path: Option<Box<std::path::Path>>,
        /// Description of the operation that failed
        operation: String,
    },
}

impl Error {
    /// Create an invalid version error.
    #[must_use]
    pub fn invalid_version(display_name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::InvalidVersion {
            display_name: display_name.into(),
            raw: raw.into(),
        }
    }

    /// Create an unsupported architecture error.
    #[must_use]
    pub fn unsupported_architecture(token: impl Into<String>) -> Self {
        Self::UnsupportedArchitecture {
            token: token.into(),
        }
    }

    /// Create a pipeline error for the given stage.
    #[must_use]
    pub fn pipeline(stage: PipelineStage, message: impl Into<String>) -> Self {
        Self::Pipeline {
            stage,
            message: message.into(),
        }
    }

    /// Create a configuration error with a message.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            help: None,
        }
    }

    /// Create a configuration error with a help hint.
    #[must_use]
    pub fn configuration_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create an I/O error with context
    pub fn io(source: std::io::Error, path: Option<PathBuf>, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: path.map(|p| p.into_boxed_path()),
            operation: operation.into(),
        }
    }

    /// Whether this error is one of the configuration checks that run before any I/O.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedOs
                | Self::InvalidVersion { .. }
                | Self::UnsupportedArchitecture { .. }
                | Self::Configuration { .. }
        )
    }
}

/// The install pipeline step a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// Network download of the archive.
    Download,
    /// Archive extraction.
    Extract,
    /// Storing the extracted tree in the tool cache.
    CacheStore,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Download => write!(f, "download"),
            Self::Extract => write!(f, "extract"),
            Self::CacheStore => write!(f, "cache store"),
        }
    }
}

/// A failure value returned by an external collaborator.
///
/// `Message` is an error that carries a message. `Opaque` is a failure value
/// with no message of its own; only its string representation is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// An error with a message.
    Message(String),
    /// A failure value without a message, kept as its string form.
    Opaque(String),
}

impl Failure {
    /// Create a message-bearing failure.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Create an opaque failure from its string form.
    #[must_use]
    pub fn opaque(repr: impl Into<String>) -> Self {
        Self::Opaque(repr.into())
    }

    /// The failure's message, if it carries one.
    #[must_use]
    pub fn as_message(&self) -> Option<&str> {
        match self {
            Self::Message(message) => Some(message),
            Self::Opaque(_) => None,
        }
    }

    /// The message when there is one, otherwise the string form.
    #[must_use]
    pub fn describe(&self) -> &str {
        match self {
            Self::Message(text) | Self::Opaque(text) => text,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

impl std::error::Error for Failure {}

impl From<std::io::Error> for Failure {
    fn from(err: std::io::Error) -> Self {
        Self::Message(err.to_string())
    }
}
