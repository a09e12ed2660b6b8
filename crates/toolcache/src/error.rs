//! Error types for the concrete collaborators.

use pyembed_core::Failure;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for tool cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the filesystem cache, downloader, extractor and remover.
///
/// Every variant carries a message, so each converts into
/// [`Failure::Message`] at the collaborator boundary.
#[derive(Error, Debug)]
pub enum Error {
    /// A tool, version or architecture component is empty or not a single path segment.
    #[error("Invalid tool cache component: '{0}'")]
    InvalidComponent(String),

    /// The directory to cache does not exist.
    #[error("Source directory {} does not exist", .0.display())]
    MissingSource(PathBuf),

    /// The HTTP client could not be built.
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request failed before a response arrived, or the body could not be read.
    #[error("Failed to download {url}: {source}")]
    Http {
        /// Requested URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("Unexpected HTTP response: {0}")]
    HttpStatus(u16),

    /// The archive could not be read.
    #[error("Failed to read zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A blocking filesystem task did not complete.
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid component error.
    #[must_use]
    pub fn invalid_component(component: impl Into<String>) -> Self {
        Self::InvalidComponent(component.into())
    }

    /// Create an HTTP transport error.
    #[must_use]
    pub fn http(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            url: url.into(),
            source,
        }
    }
}

impl From<Error> for Failure {
    fn from(err: Error) -> Self {
        Self::message(err.to_string())
    }
}
