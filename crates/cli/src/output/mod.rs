//! Structured output envelope, payload models and the text price panel.

#[cfg(test)]
mod tests;

mod data;
mod format;
mod model;
mod panel;
mod result_builder;

pub use data::*;
pub use format::OutputFormat;
pub use model::*;
pub use panel::{render_event, render_panel};
pub use result_builder::{ResultBuilder, print_panel, print_result};
