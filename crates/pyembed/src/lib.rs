//! pyembed command line front end.
//!
//! Wires the filesystem and HTTP collaborators into the installer, runs it
//! once for the requested version and maps the outcome onto an exit code.

pub mod cli;
pub mod host;
pub mod render;
pub mod tracing;

use std::sync::Arc;

use pyembed_core::{
    Collaborators, EvictionReport, Installer, InstallerConfig, PlatformSpec, RunOutcome,
};
use pyembed_toolcache::{FsRemover, FsToolCache, HttpDownloader, ZipExtractor};
use serde::Serialize;

use crate::cli::{Cli, CliError, EXIT_OK, OkEnvelope, exit_code_for, render_error};
use crate::host::ActionsHost;

/// Build the installer configuration from the command line.
///
/// Flags override the configuration file, which overrides the defaults.
pub fn load_config(cli: &Cli) -> Result<InstallerConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => InstallerConfig::load(path)?,
        None => InstallerConfig::new(),
    };

    if let Some(root) = &cli.cache_dir {
        config.cache_root.clone_from(root);
    }
    if let Some(root) = &cli.temp_dir {
        config.temp_root.clone_from(root);
    }
    if cli.report_opaque_failures {
        config.report_opaque_failures = true;
    }
    Ok(config)
}

/// Describe the host, honouring an `--arch` override.
#[must_use]
pub fn platform_for(cli: &Cli) -> PlatformSpec {
    let platform = PlatformSpec::current();
    match &cli.arch {
        Some(token) => platform.with_arch_token(token.as_str()),
        None => platform,
    }
}

/// Assemble the production collaborators around `host`.
pub fn collaborators(
    config: &InstallerConfig,
    host: Arc<ActionsHost>,
) -> Result<Collaborators, CliError> {
    let downloader = HttpDownloader::new(config.temp_root.clone())?;

    Ok(Collaborators {
        cache: Arc::new(FsToolCache::new(config.cache_root.clone())),
        downloader: Arc::new(downloader),
        extractor: Arc::new(ZipExtractor::new(config.temp_root.clone())),
        remover: Arc::new(FsRemover::new()),
        host,
    })
}

/// Result payload of a finished run, as written in JSON mode.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Published location, if the tool was installed.
    pub location: Option<String>,
    /// Whether the location came from the cache.
    pub cache_hit: bool,
    /// What the eviction pass did.
    pub eviction: EvictionReport,
    /// String form of a swallowed message-less failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abandoned: Option<String>,
}

/// What is left to write once a run is over.
///
/// Nothing here is printed until [`Completion::write`], which the binary
/// calls after the event renderer has drained, so the JSON envelope is
/// always the last line on stdout.
#[derive(Debug)]
pub enum Completion {
    /// No failure was reported.
    Finished(RunSummary),
    /// The run failed.
    Failed {
        /// The failure.
        error: CliError,
        /// Whether the host already recorded it, and with it the event stream.
        reported: bool,
    },
}

impl Completion {
    /// Settle a run outcome against the failures `host` recorded.
    ///
    /// A recorded failure fails the run even when the outcome itself is not
    /// a failure.
    #[must_use]
    pub fn settle(outcome: RunOutcome, host: &ActionsHost) -> Self {
        let failures = host.failures();
        let summary = match outcome {
            RunOutcome::Failed { error } => {
                return Self::Failed {
                    error: CliError::from(error),
                    reported: !failures.is_empty(),
                };
            }
            RunOutcome::Installed {
                location,
                cache_hit,
                eviction,
            } => RunSummary {
                location: Some(location.to_string()),
                cache_hit,
                eviction,
                abandoned: None,
            },
            RunOutcome::Abandoned { detail } => RunSummary {
                location: None,
                cache_hit: false,
                eviction: EvictionReport::default(),
                abandoned: Some(detail),
            },
        };

        match failures.into_iter().next() {
            Some(message) => Self::Failed {
                error: CliError::install(message),
                reported: true,
            },
            None => Self::Finished(summary),
        }
    }

    /// Process exit code for this completion.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Finished(_) => EXIT_OK,
            Self::Failed { error, .. } => exit_code_for(error),
        }
    }

    /// Write the result.
    ///
    /// JSON mode always writes one envelope. Otherwise only failures that
    /// never reached the event stream are written, to stderr.
    pub fn write(&self, json_mode: bool) {
        match self {
            Self::Finished(summary) => {
                if json_mode {
                    write_summary(summary);
                }
            }
            Self::Failed { error, reported } => {
                if json_mode || !reported {
                    render_error(error, json_mode);
                }
            }
        }
    }
}

#[allow(clippy::print_stdout)]
fn write_summary(summary: &RunSummary) {
    match serde_json::to_string(&OkEnvelope::new(summary)) {
        Ok(json) => println!("{json}"),
        Err(e) => ::tracing::error!(error = %e, "Failed to serialize run summary"),
    }
}

/// Run one install for the parsed command line.
///
/// Events are emitted while the run progresses; the final result is
/// returned for the caller to write.
pub async fn execute(cli: &Cli) -> Completion {
    match try_execute(cli).await {
        Ok(completion) => completion,
        Err(error) => Completion::Failed {
            error,
            reported: false,
        },
    }
}

async fn try_execute(cli: &Cli) -> Result<Completion, CliError> {
    let config = load_config(cli)?;
    let platform = platform_for(cli);
    ::tracing::debug!(?config, ?platform, "Starting run");

    let host = Arc::new(ActionsHost::from_env(!cli.json));
    let installer = Installer::new(
        config.clone(),
        platform,
        collaborators(&config, Arc::clone(&host))?,
    );

    let outcome = installer.run(&cli.python_version).await;
    Ok(Completion::settle(outcome, &host))
}
