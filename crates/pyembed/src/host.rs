//! Runner host adapter.
//!
//! Publishing appends the installed directory to the runner's path file
//! (`$GITHUB_PATH`), which the runner prepends to `PATH` for later steps.
//! Outside a runner the directory is printed instead.

use pyembed_core::{ArtifactLocation, Failure, Host};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Environment variable naming the runner's path file.
pub const PATH_FILE_ENV: &str = "GITHUB_PATH";

/// [`Host`] implementation for CI runners.
#[derive(Debug, Default)]
pub struct ActionsHost {
    path_file: Option<PathBuf>,
    echo: bool,
    failures: Mutex<Vec<String>>,
}

impl ActionsHost {
    /// Create a host writing published paths to `path_file`.
    ///
    /// Without a path file, published paths are printed to stdout when
    /// `echo` is set and dropped otherwise.
    #[must_use]
    pub fn new(path_file: Option<PathBuf>, echo: bool) -> Self {
        Self {
            path_file,
            echo,
            failures: Mutex::new(Vec::new()),
        }
    }

    /// Create a host from the process environment.
    #[must_use]
    pub fn from_env(echo: bool) -> Self {
        let path_file = std::env::var_os(PATH_FILE_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self::new(path_file, echo)
    }

    /// The path file published locations are appended to.
    #[must_use]
    pub fn path_file(&self) -> Option<&Path> {
        self.path_file.as_deref()
    }

    /// Failures reported so far.
    #[must_use]
    pub fn failures(&self) -> Vec<String> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Host for ActionsHost {
    fn report_failure(&self, message: &str) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }

    fn publish_path(&self, location: &ArtifactLocation) -> Result<(), Failure> {
        if let Some(path_file) = &self.path_file {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path_file)
                .map_err(|e| {
                    Failure::message(format!(
                        "Failed to open path file {}: {e}",
                        path_file.display()
                    ))
                })?;
            writeln!(file, "{location}").map_err(|e| {
                Failure::message(format!(
                    "Failed to write path file {}: {e}",
                    path_file.display()
                ))
            })?;
            tracing::debug!(%location, path_file = %path_file.display(), "Appended to path file");
        } else if self.echo {
            #[allow(clippy::print_stdout)]
            {
                println!("{location}");
            }
        }
        Ok(())
    }
}
