//! Concrete collaborators for the pyembed installer.
//!
//! - [`FsToolCache`]: versioned tool cache on the local filesystem
//! - [`HttpDownloader`]: fetches archives with `reqwest`
//! - [`ZipExtractor`]: unpacks zip archives
//! - [`FsRemover`]: recursive delete that treats a missing path as done
//!
//! All of them report their errors to the installer as
//! [`pyembed_core::Failure::Message`].

pub mod cache;
pub mod download;
mod error;
pub mod extract;
pub mod remove;

pub use cache::{COMPLETE_MARKER, FsToolCache};
pub use download::HttpDownloader;
pub use error::{Error, Result};
pub use extract::ZipExtractor;
pub use remove::FsRemover;
