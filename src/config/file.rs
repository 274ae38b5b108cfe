//! Configuration file management
//!
//! Handles finding, loading, validating, and layering configuration files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

use super::env::EnvConfig;
use super::{ParatestConfig, RepoConfig, ReportsConfig, TestSettings};
use crate::models::{ReportLocation, RunnerOption, TestDescriptor, TestPaths};

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./paratest.yml",
    "./paratest.yaml",
    "./.paratest.yml",
    "./.paratest/config.yml",
    "~/.config/paratest/config.yml",
];

/// Supported configuration format versions
const SUPPORTED_VERSIONS: &[&str] = &["1.0"];

/// Full configuration file structure
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Version of config file format
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub repo: RepoConfig,

    #[serde(default)]
    pub reports: ReportsConfig,

    #[serde(default)]
    pub paratest: ParatestConfig,

    #[serde(default)]
    pub test: TestSettings,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            version: default_version(),
            repo: RepoConfig::default(),
            reports: ReportsConfig::default(),
            paratest: ParatestConfig::default(),
            test: TestSettings::default(),
        }
    }
}

impl ConfigFile {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load configuration from default location
    pub fn load_default() -> Result<Self> {
        if let Some(path) = Self::find() {
            Self::load(&path)
        } else {
            debug!("No configuration file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from an explicit path, `PARATEST_CONFIG`, or the default location,
    /// then layer the environment on top
    pub fn resolve(explicit: Option<&Path>, env: &EnvConfig) -> Result<Self> {
        let mut config = match explicit.or(env.config_file.as_deref()) {
            Some(path) => Self::load(path)?,
            None => Self::load_default()?,
        };
        config.apply_env(env);

        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        config.anchor_root(&cwd);
        Ok(config)
    }

    /// Make `repo.root` absolute against `base`
    ///
    /// Descriptor paths become the runner's working directory, so the binary
    /// and report paths derived from the root must not be relative.
    pub fn anchor_root(&mut self, base: &Path) {
        if self.repo.root.is_relative() {
            self.repo.root = base
                .join(&self.repo.root)
                .components()
                .filter(|c| !matches!(c, Component::CurDir))
                .collect();
        }
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        debug!(
            "Loaded {} descriptor(s) from {}",
            config.paratest.tests.len(),
            path.display()
        );
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            anyhow::bail!("Unsupported config version: {}", self.version);
        }

        for (idx, descriptor) in self.paratest.tests.iter().enumerate() {
            if descriptor.procs == Some(0) {
                anyhow::bail!(
                    "Invalid '{}' in paratest test #{}: must be at least 1",
                    RunnerOption::Processes.key(),
                    idx + 1
                );
            }
            if descriptor.file.is_some() && descriptor.class.is_none() {
                warn!(
                    "Paratest test #{} sets 'file' without 'class'; 'file' is ignored",
                    idx + 1
                );
            }
        }

        Ok(())
    }

    /// Layer environment overrides on top of the file
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(root) = &env.repo_root {
            self.repo.root = root.clone();
        }
        if let Some(dir) = &env.reports_dir {
            self.reports.local_dir = dir.clone();
        }
        if let Some(binary) = &env.binary {
            self.paratest.binary = binary.clone();
        }
        if let Some(path) = &env.test_path {
            self.test.paths = Some(TestPaths::Single(path.clone()));
        }
    }

    /// Override the test path from the command line
    pub fn set_test_path(&mut self, path: impl Into<String>) {
        self.test.paths = Some(TestPaths::Single(path.into()));
    }

    /// Configured descriptors
    pub fn descriptors(&self) -> &[TestDescriptor] {
        &self.paratest.tests
    }

    /// Single-string test path override, if any
    pub fn fallback_path(&self) -> Option<&str> {
        self.test.paths.as_ref().and_then(TestPaths::as_single)
    }

    /// Report location under the reports directory
    pub fn report_location(&self) -> ReportLocation {
        ReportLocation::new(self.repo.root.join(&self.reports.local_dir))
    }

    /// Runner executable, relative to the repository root unless absolute
    pub fn runner_binary(&self) -> PathBuf {
        self.repo.root.join(&self.paratest.binary)
    }

    /// Generate example configuration
    pub fn example() -> Self {
        Self {
            paratest: ParatestConfig {
                tests: vec![
                    TestDescriptor {
                        path: Some("docroot/modules/custom".to_string()),
                        config: Some("docroot/core/phpunit.xml.dist".to_string()),
                        exclude_group: Some("slow".to_string()),
                        procs: Some(4),
                        ..TestDescriptor::default()
                    },
                    TestDescriptor {
                        class: Some("ExampleTest".to_string()),
                        file: Some("tests/phpunit/ExampleTest.php".to_string()),
                        ..TestDescriptor::default()
                    },
                ],
                ..ParatestConfig::default()
            },
            ..Self::default()
        }
    }
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
