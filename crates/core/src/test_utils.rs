//! Shared test utilities for pyembed-core tests.
//!
//! Recording fakes for every collaborator trait. All fakes of one
//! [`Scenario`] write into the same [`CallLog`], so tests can assert on the
//! order of calls across collaborators as well as on their arguments.

use async_trait::async_trait;
use pyembed_events::{Severity, ToolEvent, ToolEventLayer};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt;

use crate::config::InstallerConfig;
use crate::error::Failure;
use crate::installer::{Collaborators, Installer};
use crate::platform::{PlatformSpec, ResolvedArch};
use crate::provider::{ArtifactLocation, Downloader, Extractor, Host, Remover, ToolCache};

/// One collaborator invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Find {
        tool: String,
        version: String,
        arch: ResolvedArch,
    },
    FindAll {
        tool: String,
        arch: ResolvedArch,
    },
    Store {
        source: ArtifactLocation,
        tool: String,
        version: String,
        arch: ResolvedArch,
    },
    Download(String),
    Extract(ArtifactLocation),
    Remove(ArtifactLocation),
    ReportFailure(String),
    Publish(ArtifactLocation),
}

impl Call {
    /// Whether this call performs or prepares I/O against the cache, network or archive.
    pub fn is_io(&self) -> bool {
        !matches!(self, Self::ReportFailure(_))
    }
}

/// Ordered record of every call made by a scenario's collaborators.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Download(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn removals(&self) -> Vec<ArtifactLocation> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Remove(location) => Some(location),
                _ => None,
            })
            .collect()
    }

    pub fn reported_failures(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::ReportFailure(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn published(&self) -> Vec<ArtifactLocation> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Publish(location) => Some(location),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls().iter().position(pred)
    }
}

/// Location the fake cache reports for an entry.
pub fn fake_entry_location(tool: &str, version: &str, arch: ResolvedArch) -> ArtifactLocation {
    ArtifactLocation::new(format!("/cache/{tool}/{version}/{arch}"))
}

pub struct FakeCache {
    log: CallLog,
    hit: Option<ArtifactLocation>,
    versions: Vec<(ResolvedArch, String)>,
    store: Result<ArtifactLocation, Failure>,
}

#[async_trait]
impl ToolCache for FakeCache {
    fn find(&self, tool: &str, version: &str, arch: ResolvedArch) -> Option<ArtifactLocation> {
        self.log.push(Call::Find {
            tool: tool.into(),
            version: version.into(),
            arch,
        });
        self.hit.clone()
    }

    fn find_all_versions(&self, tool: &str, arch: ResolvedArch) -> Vec<String> {
        self.log.push(Call::FindAll {
            tool: tool.into(),
            arch,
        });
        self.versions
            .iter()
            .filter(|(a, _)| *a == arch)
            .map(|(_, v)| v.clone())
            .collect()
    }

    fn entry_location(&self, tool: &str, version: &str, arch: ResolvedArch) -> ArtifactLocation {
        fake_entry_location(tool, version, arch)
    }

    async fn cache_dir(
        &self,
        source: &ArtifactLocation,
        tool: &str,
        version: &str,
        arch: ResolvedArch,
    ) -> Result<ArtifactLocation, Failure> {
        self.log.push(Call::Store {
            source: source.clone(),
            tool: tool.into(),
            version: version.into(),
            arch,
        });
        self.store.clone()
    }
}

pub struct FakeDownloader {
    log: CallLog,
    result: Result<ArtifactLocation, Failure>,
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn download(&self, url: &str) -> Result<ArtifactLocation, Failure> {
        self.log.push(Call::Download(url.into()));
        self.result.clone()
    }
}

pub struct FakeExtractor {
    log: CallLog,
    result: Result<ArtifactLocation, Failure>,
}

#[async_trait]
impl Extractor for FakeExtractor {
    async fn extract(&self, archive: &ArtifactLocation) -> Result<ArtifactLocation, Failure> {
        self.log.push(Call::Extract(archive.clone()));
        self.result.clone()
    }
}

pub struct FakeRemover {
    log: CallLog,
    failing: HashMap<ArtifactLocation, Failure>,
}

#[async_trait]
impl Remover for FakeRemover {
    async fn remove_recursive(&self, location: &ArtifactLocation) -> Result<(), Failure> {
        self.log.push(Call::Remove(location.clone()));
        self.failing.get(location).map_or(Ok(()), |f| Err(f.clone()))
    }
}

pub struct FakeHost {
    log: CallLog,
    publish: Result<(), Failure>,
}

impl Host for FakeHost {
    fn report_failure(&self, message: &str) {
        self.log.push(Call::ReportFailure(message.into()));
    }

    fn publish_path(&self, location: &ArtifactLocation) -> Result<(), Failure> {
        self.log.push(Call::Publish(location.clone()));
        self.publish.clone()
    }
}

/// Canned collaborator behaviour for one run.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub config: InstallerConfig,
    pub hit: Option<ArtifactLocation>,
    pub cached_versions: Vec<(ResolvedArch, String)>,
    pub download: Result<ArtifactLocation, Failure>,
    pub extract: Result<ArtifactLocation, Failure>,
    pub store: Result<ArtifactLocation, Failure>,
    /// Versions whose removal fails, keyed by (arch, version).
    pub failing_removals: Vec<(ResolvedArch, String, Failure)>,
    pub publish: Result<(), Failure>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            config: InstallerConfig::new()
                .with_cache_root("/cache".into())
                .with_temp_root("/tmp".into()),
            hit: None,
            cached_versions: Vec::new(),
            download: Ok(ArtifactLocation::new("/tmp/download-1")),
            extract: Ok(ArtifactLocation::new("/tmp/extract-1")),
            store: Ok(ArtifactLocation::new(
                "/cache/python-embedded/3.14.0/amd64",
            )),
            failing_removals: Vec::new(),
            publish: Ok(()),
        }
    }
}

impl Scenario {
    pub fn cache_hit(mut self, location: &str) -> Self {
        self.hit = Some(ArtifactLocation::new(location));
        self
    }

    pub fn cached(mut self, arch: ResolvedArch, versions: &[&str]) -> Self {
        self.cached_versions
            .extend(versions.iter().map(|v| (arch, (*v).to_string())));
        self
    }

    pub fn download_fails(mut self, failure: Failure) -> Self {
        self.download = Err(failure);
        self
    }

    pub fn extract_fails(mut self, failure: Failure) -> Self {
        self.extract = Err(failure);
        self
    }

    pub fn store_fails(mut self, failure: Failure) -> Self {
        self.store = Err(failure);
        self
    }

    pub fn removal_fails(mut self, arch: ResolvedArch, version: &str, failure: Failure) -> Self {
        self.failing_removals
            .push((arch, version.to_string(), failure));
        self
    }

    pub fn publish_fails(mut self, failure: Failure) -> Self {
        self.publish = Err(failure);
        self
    }

    pub fn report_opaque_failures(mut self) -> Self {
        self.config.report_opaque_failures = true;
        self
    }

    /// The recording collaborators on their own.
    pub fn collaborators(self) -> (Collaborators, CallLog) {
        let log = CallLog::default();
        let tool = self.config.tool.name.clone();
        let failing = self
            .failing_removals
            .into_iter()
            .map(|(arch, version, failure)| {
                (fake_entry_location(&tool, &version, arch), failure)
            })
            .collect();

        let collaborators = Collaborators {
            cache: Arc::new(FakeCache {
                log: log.clone(),
                hit: self.hit,
                versions: self.cached_versions,
                store: self.store,
            }),
            downloader: Arc::new(FakeDownloader {
                log: log.clone(),
                result: self.download,
            }),
            extractor: Arc::new(FakeExtractor {
                log: log.clone(),
                result: self.extract,
            }),
            remover: Arc::new(FakeRemover {
                log: log.clone(),
                failing,
            }),
            host: Arc::new(FakeHost {
                log: log.clone(),
                publish: self.publish,
            }),
        };
        (collaborators, log)
    }

    /// Build an installer for `platform` wired to recording collaborators.
    pub fn installer(self, platform: PlatformSpec) -> (Installer, CallLog) {
        let config = self.config.clone();
        let (collaborators, log) = self.collaborators();
        (Installer::new(config, platform, collaborators), log)
    }
}

/// A supported host with the given raw architecture token.
pub fn windows(arch_token: &str) -> PlatformSpec {
    PlatformSpec::new(true, arch_token)
}

/// Captures pyembed events emitted on the current thread while alive.
pub struct EventCapture {
    receiver: mpsc::UnboundedReceiver<ToolEvent>,
    _guard: DefaultGuard,
}

impl EventCapture {
    pub fn start() -> Self {
        let (tx, receiver) = mpsc::unbounded_channel();
        let subscriber = tracing_subscriber::registry().with(ToolEventLayer::new(tx));
        Self {
            receiver,
            _guard: tracing::subscriber::set_default(subscriber),
        }
    }

    /// Drain everything captured so far.
    pub fn events(&mut self) -> Vec<ToolEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Drain and keep only the messages of one severity.
    pub fn messages(&mut self, severity: Severity) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.severity == severity)
            .map(|e| e.message)
            .collect()
    }
}
