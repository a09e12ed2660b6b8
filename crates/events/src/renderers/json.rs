//! JSON renderer for pyembed events.
//!
//! Renders events as JSON lines for machine consumption.
//! This module is allowed to use println! as it's the output layer.

#![allow(clippy::print_stdout)]

use crate::event::ToolEvent;

/// JSON renderer that outputs one event per line.
#[derive(Debug, Default)]
pub struct JsonRenderer;

impl JsonRenderer {
    /// Create a new JSON renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Render a single event as JSON.
    pub fn render(&self, event: &ToolEvent) {
        if let Some(json) = self.to_line(event) {
            println!("{json}");
        }
    }

    fn to_line(&self, event: &ToolEvent) -> Option<String> {
        serde_json::to_string(event).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventCategory, HostEvent, Severity};

    #[test]
    fn test_compact_line_is_single_line() {
        let event = ToolEvent::new(
            "pyembed::host",
            Severity::Info,
            "published",
            EventCategory::Host(HostEvent::PathPublished {
                location: "/cache/python-embedded/3.14.0/amd64".into(),
            }),
        );
        let line = JsonRenderer::new().to_line(&event).unwrap();
        assert!(!line.contains('\n'));
        assert!(line.contains("\"PathPublished\""));
    }

    #[test]
    fn test_failure_line_carries_message() {
        let event = ToolEvent::new(
            "pyembed::host",
            Severity::Error,
            "Download failed",
            EventCategory::Host(HostEvent::RunFailed),
        );
        let line = JsonRenderer::new().to_line(&event).unwrap();
        assert!(!line.contains('\n'));
        assert!(line.contains("\"Download failed\""));
        assert!(line.contains("\"RunFailed\""));
    }
}
