//! Configuration module
//!
//! Handles loading and layering project configuration.

pub mod env;
mod file;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{TestDescriptor, TestPaths};

pub use env::EnvConfig;
pub use file::ConfigFile;

/// Repository settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RepoConfig {
    /// Repository root; relative paths elsewhere resolve against it
    pub root: PathBuf,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

/// Report settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ReportsConfig {
    /// Base directory for local test reports
    pub local_dir: PathBuf,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            local_dir: PathBuf::from("reports"),
        }
    }
}

/// Paratest settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ParatestConfig {
    /// Runner executable
    #[serde(default = "default_binary")]
    pub binary: PathBuf,

    /// Descriptors, run in this order
    #[serde(default)]
    pub tests: Vec<TestDescriptor>,
}

fn default_binary() -> PathBuf {
    PathBuf::from("vendor/bin/paratest")
}

impl Default for ParatestConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            tests: Vec::new(),
        }
    }
}

/// Test selection settings
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TestSettings {
    /// Override for the path handed to the runner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<TestPaths>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        assert_eq!(RepoConfig::default().root, PathBuf::from("."));
        assert_eq!(ReportsConfig::default().local_dir, PathBuf::from("reports"));
        assert_eq!(
            ParatestConfig::default().binary,
            PathBuf::from("vendor/bin/paratest")
        );
        assert!(TestSettings::default().paths.is_none());
    }

    #[test]
    fn test_paratest_section_defaults_binary() {
        let section: ParatestConfig = serde_yaml::from_str("tests:\n  - path: tests\n").unwrap();
        assert_eq!(section.binary, default_binary());
        assert_eq!(section.tests.len(), 1);
    }
}
