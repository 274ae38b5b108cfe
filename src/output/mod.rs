//! Output formatting module
//!
//! Renders descriptor plans and run summaries.

mod formatter;

pub use formatter::{OutputFormat, ResultFormatter};
