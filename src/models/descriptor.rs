//! Test descriptor models
//!
//! A descriptor is one configured paratest invocation: what to run, where to
//! run it, and which runner options to pass along.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Runner options recognized in a descriptor, mapped to paratest flags
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunnerOption {
    Configuration,
    ExcludeGroup,
    Filter,
    Group,
    Testsuite,
    Processes,
}

impl RunnerOption {
    /// Configuration key as written in the project file
    pub fn key(&self) -> &'static str {
        match self {
            RunnerOption::Configuration => "config",
            RunnerOption::ExcludeGroup => "exclude-group",
            RunnerOption::Filter => "filter",
            RunnerOption::Group => "group",
            RunnerOption::Testsuite => "testsuite",
            RunnerOption::Processes => "procs",
        }
    }

    /// Flag passed to the runner
    pub fn flag(&self) -> &'static str {
        match self {
            RunnerOption::Configuration => "--configuration",
            RunnerOption::ExcludeGroup => "--exclude-group",
            RunnerOption::Filter => "--filter",
            RunnerOption::Group => "--group",
            RunnerOption::Testsuite => "--testsuite",
            RunnerOption::Processes => "--processes",
        }
    }

    /// All options, in the order they are appended to the command line
    pub fn all() -> [RunnerOption; 6] {
        [
            RunnerOption::Configuration,
            RunnerOption::ExcludeGroup,
            RunnerOption::Filter,
            RunnerOption::Group,
            RunnerOption::Testsuite,
            RunnerOption::Processes,
        ]
    }
}

/// One configured test run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TestDescriptor {
    /// Test class name, passed as the first positional argument
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    /// File holding `class`; ignored without a class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Working directory, and positional argument when nothing else applies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testsuite: Option<String>,

    /// Number of parallel worker processes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procs: Option<u32>,
}

impl TestDescriptor {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    #[cfg(test)]
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    #[cfg(test)]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set a runner option from its textual value
    ///
    /// Fails only for `procs` when the value is not a number.
    #[cfg(test)]
    pub fn with_option(
        mut self,
        option: RunnerOption,
        value: impl Into<String>,
    ) -> Result<Self, std::num::ParseIntError> {
        let value = value.into();
        match option {
            RunnerOption::Configuration => self.config = Some(value),
            RunnerOption::ExcludeGroup => self.exclude_group = Some(value),
            RunnerOption::Filter => self.filter = Some(value),
            RunnerOption::Group => self.group = Some(value),
            RunnerOption::Testsuite => self.testsuite = Some(value),
            RunnerOption::Processes => self.procs = Some(value.parse()?),
        }
        Ok(self)
    }

    /// Rendered value of a runner option, if set
    pub fn option_value(&self, option: RunnerOption) -> Option<String> {
        match option {
            RunnerOption::Configuration => self.config.clone(),
            RunnerOption::ExcludeGroup => self.exclude_group.clone(),
            RunnerOption::Filter => self.filter.clone(),
            RunnerOption::Group => self.group.clone(),
            RunnerOption::Testsuite => self.testsuite.clone(),
            RunnerOption::Processes => self.procs.map(|procs| procs.to_string()),
        }
    }

    /// Options set on this descriptor with their values, in flag order
    pub fn options(&self) -> Vec<(RunnerOption, String)> {
        RunnerOption::all()
            .into_iter()
            .filter_map(|option| self.option_value(option).map(|value| (option, value)))
            .collect()
    }

    /// Short label for logs and listings
    pub fn label(&self) -> &str {
        self.class
            .as_deref()
            .or(self.path.as_deref())
            .unwrap_or("<default>")
    }
}

impl fmt::Display for TestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())?;
        if let Some(file) = self.class.as_ref().and(self.file.as_ref()) {
            write!(f, " ({file})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_table() {
        let pairs: Vec<_> = RunnerOption::all()
            .iter()
            .map(|o| (o.key(), o.flag()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("config", "--configuration"),
                ("exclude-group", "--exclude-group"),
                ("filter", "--filter"),
                ("group", "--group"),
                ("testsuite", "--testsuite"),
                ("procs", "--processes"),
            ]
        );
    }

    #[test]
    fn test_descriptor_from_yaml() {
        let yaml = r#"
class: Drupal\Tests\my_module\Unit\FooTest
file: tests/src/Unit/FooTest.php
exclude-group: slow
procs: 4
"#;
        let descriptor: TestDescriptor = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(
            descriptor.class.as_deref(),
            Some("Drupal\\Tests\\my_module\\Unit\\FooTest")
        );
        assert_eq!(descriptor.file.as_deref(), Some("tests/src/Unit/FooTest.php"));
        assert_eq!(descriptor.exclude_group.as_deref(), Some("slow"));
        assert_eq!(descriptor.procs, Some(4));
        assert!(descriptor.path.is_none());
    }

    #[test]
    fn test_descriptor_rejects_unknown_keys() {
        let yaml = "path: tests\nprocesses: 4\n";
        let result: Result<TestDescriptor, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_options_in_flag_order() {
        let descriptor = TestDescriptor::new()
            .with_option(RunnerOption::Processes, "8")
            .unwrap()
            .with_option(RunnerOption::Filter, "testFoo")
            .unwrap();

        let options = descriptor.options();
        assert_eq!(
            options,
            vec![
                (RunnerOption::Filter, "testFoo".to_string()),
                (RunnerOption::Processes, "8".to_string()),
            ]
        );
    }

    #[test]
    fn test_procs_must_be_numeric() {
        assert!(TestDescriptor::new()
            .with_option(RunnerOption::Processes, "many")
            .is_err());
    }

    #[test]
    fn test_label() {
        assert_eq!(TestDescriptor::new().label(), "<default>");
        assert_eq!(TestDescriptor::new().with_path("tests").label(), "tests");
        assert_eq!(
            TestDescriptor::new()
                .with_path("tests")
                .with_class("FooTest")
                .label(),
            "FooTest"
        );
    }
}
