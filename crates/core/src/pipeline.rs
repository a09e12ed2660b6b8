//! Cache lookup and install pipeline.
//!
//! A hit returns the cached location without touching the network or the
//! filesystem. A miss runs download, extract and cache-store strictly in that
//! order and stops at the first failure; intermediate artifacts are left to
//! the collaborators that produced them.

use pyembed_events::{emit_cache_hit, emit_download_started, emit_tool_installed};

use crate::config::ToolSpec;
use crate::error::{Failure, PipelineStage};
use crate::provider::{ArtifactLocation, CacheKey, Downloader, Extractor, ToolCache};

/// Result of a successful lookup-or-install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    /// Where the tool now lives.
    pub location: ArtifactLocation,
    /// Whether the location came straight from the cache.
    pub cache_hit: bool,
}

/// A failed pipeline step and the collaborator's failure value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineError {
    /// The step that failed.
    pub stage: PipelineStage,
    /// What the collaborator returned.
    pub failure: Failure,
}

impl PipelineError {
    fn at(stage: PipelineStage) -> impl FnOnce(Failure) -> Self {
        move |failure| Self { stage, failure }
    }
}

/// Borrowed set of collaborators the pipeline drives.
#[derive(Clone, Copy)]
pub struct PipelineContext<'a> {
    /// The tool being installed.
    pub tool: &'a ToolSpec,
    /// Tool cache.
    pub cache: &'a dyn ToolCache,
    /// Network downloader.
    pub downloader: &'a dyn Downloader,
    /// Archive extractor.
    pub extractor: &'a dyn Extractor,
}

/// Return the cached location for `key`, installing it first on a miss.
///
/// # Errors
///
/// Returns the first failing stage together with its failure value.
pub async fn install_or_fetch(
    ctx: PipelineContext<'_>,
    key: &CacheKey,
) -> Result<Installation, PipelineError> {
    let version = key.version().as_str();
    let arch = key.arch();

    if let Some(location) = ctx.cache.find(key.tool(), version, arch) {
        emit_cache_hit!(key.tool(), version, arch, location);
        return Ok(Installation {
            location,
            cache_hit: true,
        });
    }

    let url = ctx.tool.download_url(key.version(), arch);
    emit_download_started!(
        key.tool(),
        version,
        arch,
        url,
        format!(
            "Downloading {} {} for {} from {}",
            ctx.tool.display_name, version, arch, url
        )
    );

    let archive = ctx
        .downloader
        .download(&url)
        .await
        .map_err(PipelineError::at(PipelineStage::Download))?;
    let extracted = ctx
        .extractor
        .extract(&archive)
        .await
        .map_err(PipelineError::at(PipelineStage::Extract))?;
    let location = ctx
        .cache
        .cache_dir(&extracted, key.tool(), version, arch)
        .await
        .map_err(PipelineError::at(PipelineStage::CacheStore))?;

    emit_tool_installed!(
        key.tool(),
        version,
        arch,
        location,
        format!(
            "{} {} has been installed and cached at {}",
            ctx.tool.display_name, version, location
        )
    );

    Ok(Installation {
        location,
        cache_hit: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ResolvedArch;
    use crate::test_utils::{Call, Scenario};
    use crate::version::RequestedVersion;

    fn key(version: &str) -> CacheKey {
        CacheKey::new(
            "python-embedded",
            RequestedVersion::parse(version).unwrap(),
            ResolvedArch::Amd64,
        )
    }

    #[tokio::test]
    async fn test_hit_skips_install() {
        let tool = ToolSpec::default();
        let (collaborators, log) = Scenario::default().cache_hit("/cache/hit").collaborators();
        let ctx = PipelineContext {
            tool: &tool,
            cache: collaborators.cache.as_ref(),
            downloader: collaborators.downloader.as_ref(),
            extractor: collaborators.extractor.as_ref(),
        };

        let installation = install_or_fetch(ctx, &key("3.14.0")).await.unwrap();

        assert!(installation.cache_hit);
        assert_eq!(installation.location.as_str(), "/cache/hit");
        assert_eq!(log.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_carries_stage() {
        let tool = ToolSpec::default();
        let (collaborators, log) = Scenario::default()
            .store_fails(Failure::opaque("[object Object]"))
            .collaborators();
        let ctx = PipelineContext {
            tool: &tool,
            cache: collaborators.cache.as_ref(),
            downloader: collaborators.downloader.as_ref(),
            extractor: collaborators.extractor.as_ref(),
        };

        let err = install_or_fetch(ctx, &key("3.14.0")).await.unwrap_err();

        assert_eq!(err.stage, PipelineStage::CacheStore);
        assert_eq!(err.failure, Failure::opaque("[object Object]"));
        assert!(matches!(log.calls().last(), Some(Call::Store { .. })));
    }
}
