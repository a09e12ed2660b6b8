//! Stale-version eviction.
//!
//! After a successful lookup-or-install, every other cached version of the
//! tool for the same architecture is removed. Removal failures are reported
//! as warnings and never stop the pass or the run.

use pyembed_events::{emit_eviction_completed, emit_eviction_failed, emit_eviction_started};
use serde::Serialize;

use crate::config::ToolSpec;
use crate::platform::ResolvedArch;
use crate::provider::{Remover, ToolCache};

/// What an eviction pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvictionReport {
    /// Versions whose entries were removed.
    pub removed: Vec<String>,
    /// Versions whose removal failed, with the failure text.
    pub failed: Vec<(String, String)>,
}

impl EvictionReport {
    /// Whether anything was attempted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.failed.is_empty()
    }
}

/// Remove every cached version of `tool` for `arch` other than `keep`.
///
/// Versions are compared as text: `1.0.0+a` and `1.0.0+b` are different
/// versions here even though they have equal semver precedence.
pub async fn evict_stale(
    cache: &dyn ToolCache,
    remover: &dyn Remover,
    tool: &ToolSpec,
    arch: ResolvedArch,
    keep: &str,
) -> EvictionReport {
    let mut report = EvictionReport::default();

    for version in cache
        .find_all_versions(&tool.name, arch)
        .into_iter()
        .filter(|v| v != keep)
    {
        emit_eviction_started!(
            tool.name,
            arch,
            version,
            format!("Cleaning cached {} version: {}", tool.display_name, version)
        );

        let location = cache.entry_location(&tool.name, &version, arch);
        match remover.remove_recursive(&location).await {
            Ok(()) => report.removed.push(version),
            Err(failure) => {
                let reason = failure.describe().to_string();
                emit_eviction_failed!(
                    tool.name,
                    arch,
                    version,
                    reason,
                    format!(
                        "Failed to remove cached {} version {}: {}",
                        tool.display_name, version, reason
                    )
                );
                report.failed.push((version, reason));
            }
        }
    }

    emit_eviction_completed!(
        tool.name,
        arch,
        report.removed.len() as u64,
        report.failed.len() as u64
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Failure;
    use crate::test_utils::{Call, Scenario, fake_entry_location};

    #[tokio::test]
    async fn test_empty_cache_is_a_no_op() {
        let (collaborators, log) = Scenario::default().collaborators();

        let report = evict_stale(
            collaborators.cache.as_ref(),
            collaborators.remover.as_ref(),
            &ToolSpec::default(),
            ResolvedArch::Arm64,
            "3.14.0",
        )
        .await;

        assert!(report.is_empty());
        assert_eq!(
            log.calls(),
            vec![Call::FindAll {
                tool: "python-embedded".into(),
                arch: ResolvedArch::Arm64,
            }]
        );
    }

    #[tokio::test]
    async fn test_removes_entry_for_the_given_arch() {
        let (collaborators, log) = Scenario::default()
            .cached(ResolvedArch::Win32, &["3.10.11", "3.12.0"])
            .removal_fails(ResolvedArch::Win32, "3.10.11", Failure::message("locked"))
            .collaborators();

        let report = evict_stale(
            collaborators.cache.as_ref(),
            collaborators.remover.as_ref(),
            &ToolSpec::default(),
            ResolvedArch::Win32,
            "3.12.0",
        )
        .await;

        assert_eq!(
            log.removals(),
            vec![fake_entry_location(
                "python-embedded",
                "3.10.11",
                ResolvedArch::Win32
            )]
        );
        assert!(report.removed.is_empty());
        assert_eq!(report.failed, vec![("3.10.11".to_string(), "locked".to_string())]);
    }
}
