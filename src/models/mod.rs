//! Data models for paratest invocations
//!
//! Descriptors, report locations, and run summaries.

mod descriptor;
mod report;

pub use descriptor::{RunnerOption, TestDescriptor};
pub use report::{ReportLocation, RunSummary, TestPaths};
