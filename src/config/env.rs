//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;
use std::path::PathBuf;

/// Environment variable prefix
const ENV_PREFIX: &str = "PARATEST";

/// Configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Config file from PARATEST_CONFIG
    pub config_file: Option<PathBuf>,
    /// Repository root from PARATEST_REPO_ROOT
    pub repo_root: Option<PathBuf>,
    /// Reports directory from PARATEST_REPORTS_DIR
    pub reports_dir: Option<PathBuf>,
    /// Runner binary from PARATEST_BINARY
    pub binary: Option<PathBuf>,
    /// Test path override from PARATEST_TEST_PATH
    pub test_path: Option<String>,
    /// Log level from PARATEST_LOG
    pub log_level: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            config_file: get_env("CONFIG").map(PathBuf::from),
            repo_root: get_env("REPO_ROOT").map(PathBuf::from),
            reports_dir: get_env("REPORTS_DIR").map(PathBuf::from),
            binary: get_env("BINARY").map(PathBuf::from),
            test_path: get_env("TEST_PATH"),
            log_level: get_env("LOG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.config_file.is_some()
            || self.repo_root.is_some()
            || self.reports_dir.is_some()
            || self.binary.is_some()
            || self.test_path.is_some()
            || self.log_level.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_CONFIG:       {:?}", ENV_PREFIX, self.config_file);
        println!("  {}_REPO_ROOT:    {:?}", ENV_PREFIX, self.repo_root);
        println!("  {}_REPORTS_DIR:  {:?}", ENV_PREFIX, self.reports_dir);
        println!("  {}_BINARY:       {:?}", ENV_PREFIX, self.binary);
        println!("  {}_TEST_PATH:    {:?}", ENV_PREFIX, self.test_path);
        println!("  {}_LOG:          {:?}", ENV_PREFIX, self.log_level);
    }
}

/// Get non-empty environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}"))
        .ok()
        .filter(|value| !value.is_empty())
}

/// Print all PARATEST environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_CONFIG       Path to configuration file");
    println!("  {ENV_PREFIX}_REPO_ROOT    Repository root directory");
    println!("  {ENV_PREFIX}_REPORTS_DIR  Base directory for test reports");
    println!("  {ENV_PREFIX}_BINARY       Paratest executable");
    println!("  {ENV_PREFIX}_TEST_PATH    Path passed to paratest for every descriptor without a class");
    println!("  {ENV_PREFIX}_LOG          Log level (trace, debug, info, warn, error)");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_TEST_PATH=tests/phpunit/ExampleTest.php");
    println!("  paratest-runner run");
}

#[cfg(test)]
pub(crate) mod testing {
    use std::env;
    use std::sync::{Mutex, MutexGuard};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Guard that restores environment variables on drop
    ///
    /// Holds a process-wide lock so tests touching the environment do not
    /// interleave.
    pub struct EnvGuard {
        previous: Vec<(String, Option<String>)>,
        _lock: MutexGuard<'static, ()>,
    }

    impl EnvGuard {
        pub fn set(vars: &[(&str, &str)]) -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let previous = vars
                .iter()
                .map(|(k, _)| (k.to_string(), env::var(k).ok()))
                .collect();

            for (key, value) in vars {
                env::set_var(key, value);
            }

            Self {
                previous,
                _lock: lock,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.previous {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
