//! Output renderers for pyembed events.

mod cli;
mod json;

pub use cli::{CliRenderer, CliRendererConfig, escape_workflow_data};
pub use json::JsonRenderer;
