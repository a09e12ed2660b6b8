//! Run orchestration.
//!
//! A run is linear: platform check, version check, architecture check,
//! lookup-or-install, eviction, publish. Any of the first four can end the
//! run; eviction never does.

use pyembed_events::{emit_path_published, emit_run_failed};
use std::sync::Arc;

use crate::config::InstallerConfig;
use crate::error::{Error, Failure};
use crate::evict::{EvictionReport, evict_stale};
use crate::pipeline::{Installation, PipelineContext, install_or_fetch};
use crate::platform::PlatformSpec;
use crate::provider::{ArtifactLocation, CacheKey, Downloader, Extractor, Host, Remover, ToolCache};
use crate::version::RequestedVersion;

/// External collaborators used by an [`Installer`].
#[derive(Clone)]
pub struct Collaborators {
    /// Versioned tool cache.
    pub cache: Arc<dyn ToolCache>,
    /// Archive downloader.
    pub downloader: Arc<dyn Downloader>,
    /// Archive extractor.
    pub extractor: Arc<dyn Extractor>,
    /// Recursive delete primitive.
    pub remover: Arc<dyn Remover>,
    /// The calling environment.
    pub host: Arc<dyn Host>,
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The tool is installed and its location was published.
    Installed {
        /// Published location.
        location: ArtifactLocation,
        /// Whether the location came from the cache.
        cache_hit: bool,
        /// What the eviction pass did.
        eviction: EvictionReport,
    },
    /// The run ended with a reported terminal failure.
    Failed {
        /// The reported error.
        error: Error,
    },
    /// A pipeline step failed without a message and nothing was reported.
    Abandoned {
        /// String form of the swallowed failure.
        detail: String,
    },
}

impl RunOutcome {
    /// Whether the run published a location.
    #[must_use]
    pub const fn is_installed(&self) -> bool {
        matches!(self, Self::Installed { .. })
    }

    /// The published location, if any.
    #[must_use]
    pub const fn location(&self) -> Option<&ArtifactLocation> {
        match self {
            Self::Installed { location, .. } => Some(location),
            _ => None,
        }
    }

    /// The reported error, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Installs one tool version into the cache and publishes it.
pub struct Installer {
    config: InstallerConfig,
    platform: PlatformSpec,
    collaborators: Collaborators,
}

impl Installer {
    /// Create an installer. The platform is fixed for the installer's lifetime.
    #[must_use]
    pub fn new(
        config: InstallerConfig,
        platform: PlatformSpec,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            config,
            platform,
            collaborators,
        }
    }

    /// Execute one run for the raw version input.
    pub async fn run(&self, raw_version: &str) -> RunOutcome {
        match self.execute(raw_version).await {
            Ok((installation, eviction)) => RunOutcome::Installed {
                location: installation.location,
                cache_hit: installation.cache_hit,
                eviction,
            },
            Err(Step::Abandoned(detail)) => {
                tracing::debug!(
                    target: "pyembed::install",
                    detail = %detail,
                    "Pipeline failed without a message; ending run without a reported failure"
                );
                RunOutcome::Abandoned { detail }
            }
            Err(Step::Failed(error)) => {
                let message = error.to_string();
                emit_run_failed!(message);
                self.collaborators.host.report_failure(&message);
                RunOutcome::Failed { error }
            }
        }
    }

    async fn execute(
        &self,
        raw_version: &str,
    ) -> Result<(Installation, EvictionReport), Step> {
        let tool = &self.config.tool;

        if !self.platform.os_supported {
            return Err(Step::Failed(Error::UnsupportedOs));
        }

        let version = RequestedVersion::parse(raw_version)
            .map_err(|invalid| Error::invalid_version(&tool.display_name, invalid.raw))?;

        let arch = self
            .platform
            .resolve()
            .ok_or_else(|| Error::unsupported_architecture(&self.platform.arch_token))?;

        let key = CacheKey::new(&tool.name, version, arch);
        let ctx = PipelineContext {
            tool,
            cache: self.collaborators.cache.as_ref(),
            downloader: self.collaborators.downloader.as_ref(),
            extractor: self.collaborators.extractor.as_ref(),
        };

        let installation = install_or_fetch(ctx, &key).await.map_err(|err| {
            match err.failure {
                Failure::Message(message) => Step::Failed(Error::pipeline(err.stage, message)),
                Failure::Opaque(repr) if self.config.report_opaque_failures => {
                    Step::Failed(Error::pipeline(err.stage, repr))
                }
                Failure::Opaque(repr) => Step::Abandoned(repr),
            }
        })?;

        let eviction = evict_stale(
            self.collaborators.cache.as_ref(),
            self.collaborators.remover.as_ref(),
            tool,
            arch,
            key.version().as_str(),
        )
        .await;

        self.collaborators
            .host
            .publish_path(&installation.location)
            .map_err(|failure| Error::Publish {
                message: failure.describe().to_string(),
            })?;
        emit_path_published!(installation.location);

        Ok((installation, eviction))
    }
}

enum Step {
    Failed(Error),
    Abandoned(String),
}

impl From<Error> for Step {
    fn from(error: Error) -> Self {
        Self::Failed(error)
    }
}
