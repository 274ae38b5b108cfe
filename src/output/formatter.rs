//! Output formatters for plans and run summaries
//!
//! Provides table and JSON output formats.

use serde::Serialize;

use crate::executor::ParatestCommand;
use crate::models::{RunSummary, TestDescriptor};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            _ => None,
        }
    }
}

/// A descriptor next to the command it expands to
#[derive(Serialize)]
struct PlanEntry<'a> {
    index: usize,
    descriptor: &'a TestDescriptor,
    command: &'a ParatestCommand,
}

/// Formatter for plans and summaries
pub struct ResultFormatter {
    format: OutputFormat,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format descriptors with their planned commands
    pub fn format_plan(
        &self,
        descriptors: &[TestDescriptor],
        plan: &[ParatestCommand],
    ) -> String {
        let entries: Vec<_> = descriptors
            .iter()
            .zip(plan)
            .enumerate()
            .map(|(idx, (descriptor, command))| PlanEntry {
                index: idx + 1,
                descriptor,
                command,
            })
            .collect();

        match self.format {
            OutputFormat::Table => self.format_plan_table(&entries),
            OutputFormat::Json => serde_json::to_string(&entries).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(&entries).unwrap_or_default(),
        }
    }

    fn format_plan_table(&self, entries: &[PlanEntry<'_>]) -> String {
        if entries.is_empty() {
            return "No paratest descriptors configured.".to_string();
        }

        let mut output = String::new();
        output.push_str(&format!("Paratest descriptors ({} total)\n", entries.len()));
        output.push_str(&format!("{:-<72}\n", ""));

        for entry in entries {
            output.push_str(&format!("{:2}. {}\n", entry.index, entry.descriptor));

            let options = entry.descriptor.options();
            if !options.is_empty() {
                let rendered: Vec<_> = options
                    .iter()
                    .map(|(option, value)| format!("{}={}", option.key(), value))
                    .collect();
                output.push_str(&format!("    options: {}\n", rendered.join(", ")));
            }
            if let Some(dir) = &entry.command.working_dir {
                output.push_str(&format!("    dir:     {}\n", dir.display()));
            }
            output.push_str(&format!("    command: {}\n", entry.command.display()));
        }

        output
    }

    /// Format the summary of a successful run
    pub fn format_summary(&self, summary: &RunSummary) -> String {
        match self.format {
            OutputFormat::Table => format!(
                "✓ Paratest passed: {} descriptor(s) in {}ms\n  Report: {}",
                summary.descriptors_run,
                summary.duration_ms,
                summary.report_file.display()
            ),
            OutputFormat::Json => serde_json::to_string(summary).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(summary).unwrap_or_default(),
        }
    }
}
