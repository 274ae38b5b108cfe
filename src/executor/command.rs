//! Paratest command line construction

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::models::TestDescriptor;

/// Flag naming the JUnit report file
pub const LOG_JUNIT_FLAG: &str = "--log-junit";

/// A fully built runner invocation
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParatestCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl ParatestCommand {
    /// Build the invocation for one descriptor
    ///
    /// Positional arguments come first: the class (and its file), otherwise
    /// the single-string fallback path, otherwise the descriptor path. A
    /// descriptor path always becomes the working directory. Runner options
    /// follow in flag order, and the shared report file closes the line.
    pub fn from_descriptor(
        program: impl Into<PathBuf>,
        descriptor: &TestDescriptor,
        fallback_path: Option<&str>,
        report_file: &Path,
    ) -> Self {
        let mut args = Vec::new();

        if let Some(class) = &descriptor.class {
            args.push(class.clone());
            if let Some(file) = &descriptor.file {
                args.push(file.clone());
            }
        } else if let Some(fallback) = fallback_path {
            args.push(fallback.to_string());
        } else if let Some(path) = &descriptor.path {
            args.push(path.clone());
        }

        for (option, value) in descriptor.options() {
            args.push(option.flag().to_string());
            args.push(value);
        }

        args.push(LOG_JUNIT_FLAG.to_string());
        args.push(report_file.to_string_lossy().to_string());

        Self {
            program: program.into(),
            args,
            working_dir: descriptor.path.as_ref().map(PathBuf::from),
        }
    }

    /// Positional arguments (everything before the first flag)
    #[cfg(test)]
    pub fn positional(&self) -> &[String] {
        let end = self
            .args
            .iter()
            .position(|arg| arg.starts_with("--"))
            .unwrap_or(self.args.len());
        &self.args[..end]
    }

    /// Value following `flag`, if present
    #[cfg(test)]
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|idx| self.args.get(idx + 1))
            .map(String::as_str)
    }

    /// Shell-like rendering for logs and dry runs
    pub fn display(&self) -> String {
        let mut line = quote(&self.program.to_string_lossy());
        for arg in &self.args {
            line.push(' ');
            line.push_str(&quote(arg));
        }
        line
    }
}

impl fmt::Display for ParatestCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(dir) = &self.working_dir {
            write!(f, "(cd {} && {})", quote(&dir.to_string_lossy()), self.display())
        } else {
            write!(f, "{}", self.display())
        }
    }
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
        format!("'{}'", arg.replace('\'', r"'\''"))
    } else {
        arg.to_string()
    }
}
