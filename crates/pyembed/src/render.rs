//! Event rendering task.
//!
//! The event layer lives in the global subscriber and never drops its sender,
//! so the render task stops on an explicit shutdown signal and drains
//! whatever is still queued.

use pyembed_events::{CliRenderer, CliRendererConfig, JsonRenderer, ToolEvent};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// The renderer attached to the event stream.
#[derive(Debug)]
pub enum Renderer {
    /// Human-readable lines, optionally as workflow commands.
    Cli(CliRenderer),
    /// One JSON object per event.
    Json(JsonRenderer),
}

impl Renderer {
    /// Pick the renderer for the output mode.
    #[must_use]
    pub fn for_mode(json: bool, annotations: bool, verbose: bool) -> Self {
        if json {
            Self::Json(JsonRenderer::new())
        } else {
            Self::Cli(CliRenderer::with_config(CliRendererConfig {
                annotations,
                verbose,
                ..CliRendererConfig::default()
            }))
        }
    }

    /// Render a single event.
    pub fn render(&self, event: &ToolEvent) {
        match self {
            Self::Cli(renderer) => renderer.render(event),
            Self::Json(renderer) => renderer.render(event),
        }
    }

    /// Start rendering `receiver` on a background task.
    #[must_use]
    pub fn spawn(self, receiver: mpsc::UnboundedReceiver<ToolEvent>) -> RenderHandle {
        let (shutdown, signal) = oneshot::channel();
        let task = tokio::spawn(render_loop(self, receiver, signal));
        RenderHandle { shutdown, task }
    }
}

/// Handle to a running render task.
#[derive(Debug)]
pub struct RenderHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<usize>,
}

impl RenderHandle {
    /// Stop the task after rendering everything already queued.
    ///
    /// Returns the number of events rendered.
    pub async fn finish(self) -> usize {
        let _ = self.shutdown.send(());
        self.task.await.unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Render task ended abnormally");
            0
        })
    }
}

async fn render_loop(
    renderer: Renderer,
    mut receiver: mpsc::UnboundedReceiver<ToolEvent>,
    mut signal: oneshot::Receiver<()>,
) -> usize {
    let mut rendered = 0;
    loop {
        tokio::select! {
            biased;
            event = receiver.recv() => match event {
                Some(event) => {
                    renderer.render(&event);
                    rendered += 1;
                }
                None => return rendered,
            },
            _ = &mut signal => break,
        }
    }

    while let Ok(event) = receiver.try_recv() {
        renderer.render(&event);
        rendered += 1;
    }
    rendered
}
