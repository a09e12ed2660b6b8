//! CLI renderer for pyembed events.
//!
//! Renders events to stdout/stderr for terminal display. With annotations
//! enabled, warnings and failures are written as CI workflow commands
//! (`::warning::`, `::error::`) so the runner surfaces them in its UI.
//! This module is allowed to use println!/eprintln! as it's the output layer.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use crate::event::{Severity, ToolEvent};
use std::io::{self, IsTerminal, Write};

/// CLI renderer configuration.
#[derive(Debug, Clone)]
pub struct CliRendererConfig {
    /// Emit workflow-command annotations for warnings and failures.
    pub annotations: bool,
    /// Whether to show debug-severity events.
    pub verbose: bool,
    /// Whether to use ANSI colors for plain warnings and errors.
    pub colors: bool,
}

impl Default for CliRendererConfig {
    fn default() -> Self {
        Self {
            annotations: false,
            verbose: false,
            colors: io::stderr().is_terminal(),
        }
    }
}

/// Where a rendered line goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sink {
    Stdout,
    Stderr,
}

/// CLI renderer that outputs events to stdout/stderr.
#[derive(Debug)]
pub struct CliRenderer {
    config: CliRendererConfig,
}

impl Default for CliRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl CliRenderer {
    /// Create a new CLI renderer with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: CliRendererConfig::default(),
        }
    }

    /// Create a new CLI renderer with the given configuration.
    #[must_use]
    pub fn with_config(config: CliRendererConfig) -> Self {
        Self { config }
    }

    /// Render a single event.
    pub fn render(&self, event: &ToolEvent) {
        let Some((sink, line)) = self.format(event) else {
            return;
        };
        match sink {
            Sink::Stdout => {
                println!("{line}");
                let _ = io::stdout().flush();
            }
            Sink::Stderr => {
                eprintln!("{line}");
                let _ = io::stderr().flush();
            }
        }
    }

    fn format(&self, event: &ToolEvent) -> Option<(Sink, String)> {
        let message = &event.message;
        match event.severity {
            Severity::Debug => self
                .config
                .verbose
                .then(|| (Sink::Stderr, format!("[{}] {message}", event.target))),
            Severity::Info => Some((Sink::Stdout, message.clone())),
            Severity::Warning => Some(self.annotated("warning", message)),
            Severity::Error => Some(self.annotated("error", message)),
        }
    }

    fn annotated(&self, command: &str, message: &str) -> (Sink, String) {
        if self.config.annotations {
            // Workflow commands are only recognised on stdout
            (
                Sink::Stdout,
                format!("::{command}::{}", escape_workflow_data(message)),
            )
        } else if self.config.colors {
            let color = if command == "error" { "31" } else { "33" };
            (
                Sink::Stderr,
                format!("\x1b[{color}m{command}\x1b[0m: {message}"),
            )
        } else {
            (Sink::Stderr, format!("{command}: {message}"))
        }
    }
}

/// Escape a message for use as workflow-command data.
#[must_use]
pub fn escape_workflow_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
