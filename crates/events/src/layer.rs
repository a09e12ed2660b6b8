//! Custom tracing Layer for capturing pyembed events.
//!
//! This layer intercepts tracing events with `pyembed` targets and an
//! `event_type` field, converts them to `ToolEvent` instances, and sends
//! them down a channel to whichever renderer is attached.

use crate::event::{EventCategory, EvictEvent, HostEvent, InstallEvent, Severity, ToolEvent};
use tokio::sync::mpsc;
use tracing::Subscriber;
use tracing::field::{Field, Visit};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

/// A tracing Layer that captures pyembed-specific events.
///
/// Events are identified by their `target` (must start with "pyembed")
/// and an `event_type` field that specifies the event category.
pub struct ToolEventLayer {
    sender: mpsc::UnboundedSender<ToolEvent>,
}

impl ToolEventLayer {
    /// Create a new layer that sends events to the given channel.
    #[must_use]
    pub fn new(sender: mpsc::UnboundedSender<ToolEvent>) -> Self {
        Self { sender }
    }
}

impl<S> Layer<S> for ToolEventLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let target = meta.target();

        if !target.starts_with("pyembed") {
            return;
        }

        let mut visitor = ToolEventVisitor::new(target, Severity::from_level(*meta.level()));
        event.record(&mut visitor);

        if let Some(tool_event) = visitor.build() {
            // Receiver gone means nobody is rendering any more.
            let _ = self.sender.send(tool_event);
        }
    }
}

/// Visitor for extracting typed fields from tracing events.
#[derive(Default)]
struct ToolEventVisitor {
    target: String,
    severity: Option<Severity>,
    event_type: Option<String>,
    message: Option<String>,
    tool: Option<String>,
    version: Option<String>,
    arch: Option<String>,
    url: Option<String>,
    location: Option<String>,
    error: Option<String>,
    removed: Option<u64>,
    failed: Option<u64>,
}

impl ToolEventVisitor {
    fn new(target: &str, severity: Severity) -> Self {
        Self {
            target: target.to_string(),
            severity: Some(severity),
            ..Self::default()
        }
    }

    fn build(self) -> Option<ToolEvent> {
        let event_type = self.event_type.as_deref()?;

        let category = match event_type {
            "install.download_started" => EventCategory::Install(InstallEvent::DownloadStarted {
                tool: self.tool?,
                version: self.version?,
                arch: self.arch?,
                url: self.url?,
            }),
            "install.installed" => EventCategory::Install(InstallEvent::Installed {
                tool: self.tool?,
                version: self.version?,
                arch: self.arch?,
                location: self.location?,
            }),
            "install.cache_hit" => EventCategory::Install(InstallEvent::CacheHit {
                tool: self.tool?,
                version: self.version?,
                arch: self.arch?,
                location: self.location?,
            }),

            "evict.started" => EventCategory::Evict(EvictEvent::Started {
                tool: self.tool?,
                arch: self.arch?,
                version: self.version?,
            }),
            "evict.failed" => EventCategory::Evict(EvictEvent::Failed {
                tool: self.tool?,
                arch: self.arch?,
                version: self.version?,
                error: self.error?,
            }),
            "evict.completed" => EventCategory::Evict(EvictEvent::Completed {
                tool: self.tool?,
                arch: self.arch?,
                removed: self.removed.unwrap_or(0),
                failed: self.failed.unwrap_or(0),
            }),

            "host.path_published" => EventCategory::Host(HostEvent::PathPublished {
                location: self.location?,
            }),
            "host.run_failed" => EventCategory::Host(HostEvent::RunFailed),

            _ => return None,
        };

        Some(ToolEvent::new(
            self.target,
            self.severity.unwrap_or(Severity::Info),
            self.message.unwrap_or_default(),
            category,
        ))
    }

    fn assign(&mut self, name: &str, value: String) {
        match name {
            "event_type" => self.event_type = Some(value),
            "message" => self.message = Some(value),
            "tool" => self.tool = Some(value),
            "version" => self.version = Some(value),
            "arch" => self.arch = Some(value),
            "url" => self.url = Some(value),
            "location" => self.location = Some(value),
            "error" => self.error = Some(value),
            _ => {}
        }
    }
}

impl Visit for ToolEventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.assign(field.name(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "removed" => self.removed = Some(value),
            "failed" => self.failed = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        if let Ok(value) = u64::try_from(value) {
            self.record_u64(field, value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        // `%` fields and the formatted message both arrive here
        self.assign(field.name(), format!("{value:?}"));
    }
}
