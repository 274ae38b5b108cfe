//! Report location and run summary models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Subdirectory of the reports directory holding paratest output
pub const REPORT_SUBDIR: &str = "phpunit";

/// JUnit report file name
pub const REPORT_FILE: &str = "results.xml";

/// Where the runner writes its JUnit report
///
/// Every descriptor in an invocation writes to the same file, so a later run
/// overwrites an earlier one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportLocation {
    pub dir: PathBuf,
    pub file: PathBuf,
}

impl ReportLocation {
    /// Compute the location under a reports base directory
    pub fn new(reports_dir: impl AsRef<Path>) -> Self {
        let dir = reports_dir.as_ref().join(REPORT_SUBDIR);
        let file = dir.join(REPORT_FILE);
        Self { dir, file }
    }
}

/// The `test.paths` override
///
/// Only the single-string form is used as a positional argument.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestPaths {
    Single(String),
    Many(Vec<String>),
}

impl TestPaths {
    pub fn as_single(&self) -> Option<&str> {
        match self {
            TestPaths::Single(path) => Some(path.as_str()),
            TestPaths::Many(_) => None,
        }
    }
}

/// Summary of a successful invocation
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    pub descriptors_run: usize,
    pub report_file: PathBuf,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl RunSummary {
    pub fn new(report_file: impl Into<PathBuf>) -> Self {
        Self {
            descriptors_run: 0,
            report_file: report_file.into(),
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }
}
