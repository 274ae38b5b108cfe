//! Paratest invocation runner
//!
//! Runs every configured descriptor in order, one child process at a time,
//! and stops at the first failure.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info};

use super::command::ParatestCommand;
use super::launcher::{ProcessLauncher, TokioLauncher};
use crate::models::{ReportLocation, RunSummary, TestDescriptor};
use crate::utils::Timer;

/// Runner errors
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Failed to create report location {}: {source}", .path.display())]
    Setup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to launch {}: {source}", .program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Paratest tests failed.")]
    TestsFailed {
        descriptor: String,
        exit_code: Option<i32>,
    },
}

impl RunError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Setup { .. } => 2,
            RunError::Launch { .. } | RunError::TestsFailed { .. } => 1,
        }
    }
}

/// Sequential paratest runner
pub struct ParatestRunner<L = TokioLauncher> {
    binary: PathBuf,
    report: ReportLocation,
    launcher: L,
}

impl ParatestRunner<TokioLauncher> {
    /// Create a runner that launches real processes
    pub fn new(binary: impl Into<PathBuf>, report: ReportLocation) -> Self {
        Self::with_launcher(binary, report, TokioLauncher::new())
    }
}

impl<L: ProcessLauncher> ParatestRunner<L> {
    pub fn with_launcher(
        binary: impl Into<PathBuf>,
        report: ReportLocation,
        launcher: L,
    ) -> Self {
        Self {
            binary: binary.into(),
            report,
            launcher,
        }
    }

    pub fn report(&self) -> &ReportLocation {
        &self.report
    }

    #[cfg(test)]
    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Build every command without running anything
    pub fn plan(
        &self,
        descriptors: &[TestDescriptor],
        fallback_path: Option<&str>,
    ) -> Vec<ParatestCommand> {
        descriptors
            .iter()
            .map(|descriptor| self.command_for(descriptor, fallback_path))
            .collect()
    }

    fn command_for(
        &self,
        descriptor: &TestDescriptor,
        fallback_path: Option<&str>,
    ) -> ParatestCommand {
        ParatestCommand::from_descriptor(
            self.binary.clone(),
            descriptor,
            fallback_path,
            &self.report.file,
        )
    }

    /// Create the report directory and an empty report file
    ///
    /// An existing report file is left as it is.
    pub fn create_logs(&self) -> Result<(), RunError> {
        debug!("Creating report directory {}", self.report.dir.display());
        std::fs::create_dir_all(&self.report.dir).map_err(|source| RunError::Setup {
            path: self.report.dir.clone(),
            source,
        })?;

        debug!("Touching report file {}", self.report.file.display());
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.report.file)
            .map_err(|source| RunError::Setup {
                path: self.report.file.clone(),
                source,
            })?;

        Ok(())
    }

    /// Run all descriptors in order
    ///
    /// Stops at the first child that exits non-zero; later descriptors are
    /// never launched.
    pub async fn run(
        &self,
        descriptors: &[TestDescriptor],
        fallback_path: Option<&str>,
    ) -> Result<RunSummary, RunError> {
        self.create_logs()?;

        let start = Instant::now();
        let mut summary = RunSummary::new(&self.report.file);
        let total = descriptors.len();

        info!("Running {} paratest descriptor(s)", total);

        for (idx, descriptor) in descriptors.iter().enumerate() {
            let command = self.command_for(descriptor, fallback_path);
            info!("[{}/{}] {}", idx + 1, total, command);

            let timer = Timer::start(format!("paratest {descriptor}"));
            let outcome = self
                .launcher
                .launch(&command)
                .await
                .map_err(|source| RunError::Launch {
                    program: command.program.clone(),
                    source,
                })?;
            timer.stop();

            summary.descriptors_run += 1;

            if !outcome.success() {
                error!(
                    "Paratest exited with {} for {}",
                    outcome
                        .code
                        .map(|code| code.to_string())
                        .unwrap_or_else(|| "signal".to_string()),
                    descriptor
                );
                return Err(RunError::TestsFailed {
                    descriptor: descriptor.to_string(),
                    exit_code: outcome.code,
                });
            }
        }

        summary.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Paratest completed: {} descriptor(s) in {}ms",
            summary.descriptors_run, summary.duration_ms
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::launcher::ExitOutcome;
    use crate::models::RunnerOption;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Records launched commands and replays scripted exit codes
    #[derive(Default)]
    struct RecordingLauncher {
        codes: Mutex<VecDeque<i32>>,
        launched: Mutex<Vec<ParatestCommand>>,
    }

    impl RecordingLauncher {
        fn with_codes(codes: &[i32]) -> Self {
            Self {
                codes: Mutex::new(codes.iter().copied().collect()),
                launched: Mutex::new(Vec::new()),
            }
        }

        fn launched(&self) -> Vec<ParatestCommand> {
            self.launched.lock().unwrap().clone()
        }
    }

    impl ProcessLauncher for RecordingLauncher {
        async fn launch(&self, command: &ParatestCommand) -> io::Result<ExitOutcome> {
            self.launched.lock().unwrap().push(command.clone());
            let code = self.codes.lock().unwrap().pop_front().unwrap_or(0);
            Ok(ExitOutcome::from_code(code))
        }
    }

    struct FailingLauncher;

    impl ProcessLauncher for FailingLauncher {
        async fn launch(&self, _command: &ParatestCommand) -> io::Result<ExitOutcome> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }
    }

    fn descriptors(n: usize) -> Vec<TestDescriptor> {
        (0..n)
            .map(|i| TestDescriptor::new().with_class(format!("Test{i}")))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_run_creates_report() {
        let dir = tempdir().unwrap();
        let report = ReportLocation::new(dir.path().join("reports"));
        let runner =
            ParatestRunner::with_launcher("paratest", report.clone(), RecordingLauncher::default());

        let summary = runner.run(&[], None).await.unwrap();

        assert_eq!(summary.descriptors_run, 0);
        assert!(report.dir.is_dir());
        assert!(report.file.is_file());
        assert_eq!(std::fs::metadata(&report.file).unwrap().len(), 0);
        assert!(runner.launcher().launched().is_empty());
    }

    #[tokio::test]
    async fn test_existing_report_is_kept() {
        let dir = tempdir().unwrap();
        let report = ReportLocation::new(dir.path());
        std::fs::create_dir_all(&report.dir).unwrap();
        std::fs::write(&report.file, "<testsuites/>").unwrap();

        let runner =
            ParatestRunner::with_launcher("paratest", report.clone(), RecordingLauncher::default());
        runner.create_logs().unwrap();

        assert_eq!(std::fs::read_to_string(&report.file).unwrap(), "<testsuites/>");
    }

    #[tokio::test]
    async fn test_all_descriptors_run_in_order() {
        let dir = tempdir().unwrap();
        let report = ReportLocation::new(dir.path());
        let runner =
            ParatestRunner::with_launcher("paratest", report.clone(), RecordingLauncher::default());

        let summary = runner.run(&descriptors(3), None).await.unwrap();

        assert_eq!(summary.descriptors_run, 3);
        let launched = runner.launcher().launched();
        let firsts: Vec<_> = launched.iter().map(|c| c.args[0].as_str()).collect();
        assert_eq!(firsts, ["Test0", "Test1", "Test2"]);

        let report_file = report.file.to_string_lossy().to_string();
        for command in &launched {
            assert_eq!(command.flag_value("--log-junit"), Some(report_file.as_str()));
        }
    }

    #[tokio::test]
    async fn test_failure_stops_remaining_descriptors() {
        let dir = tempdir().unwrap();
        let runner = ParatestRunner::with_launcher(
            "paratest",
            ReportLocation::new(dir.path()),
            RecordingLauncher::with_codes(&[0, 1, 0, 0]),
        );

        let err = runner.run(&descriptors(4), None).await.unwrap_err();

        assert_eq!(runner.launcher().launched().len(), 2);
        assert_eq!(err.to_string(), "Paratest tests failed.");
        assert_eq!(err.exit_code(), 1);
        match err {
            RunError::TestsFailed {
                descriptor,
                exit_code,
            } => {
                assert_eq!(descriptor, "Test1");
                assert_eq!(exit_code, Some(1));
            }
            other => panic!("Expected TestsFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_first_descriptor_failure() {
        let dir = tempdir().unwrap();
        let runner = ParatestRunner::with_launcher(
            "paratest",
            ReportLocation::new(dir.path()),
            RecordingLauncher::with_codes(&[255]),
        );

        assert!(runner.run(&descriptors(3), None).await.is_err());
        assert_eq!(runner.launcher().launched().len(), 1);
    }

    #[tokio::test]
    async fn test_setup_failure_runs_nothing() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("reports");
        std::fs::write(&blocker, "not a directory").unwrap();

        let runner = ParatestRunner::with_launcher(
            "paratest",
            ReportLocation::new(&blocker),
            RecordingLauncher::default(),
        );

        let err = runner.run(&descriptors(2), None).await.unwrap_err();

        assert!(matches!(err, RunError::Setup { .. }));
        assert_eq!(err.exit_code(), 2);
        assert!(runner.launcher().launched().is_empty());
    }

    #[tokio::test]
    async fn test_launch_failure() {
        let dir = tempdir().unwrap();
        let runner = ParatestRunner::with_launcher(
            "paratest",
            ReportLocation::new(dir.path()),
            FailingLauncher,
        );

        let err = runner.run(&descriptors(1), None).await.unwrap_err();

        assert!(matches!(err, RunError::Launch { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_fallback_path_used_for_every_descriptor() {
        let dir = tempdir().unwrap();
        let runner = ParatestRunner::with_launcher(
            "paratest",
            ReportLocation::new(dir.path()),
            RecordingLauncher::default(),
        );
        let descriptors = vec![
            TestDescriptor::new().with_path("modules/a"),
            TestDescriptor::new()
                .with_option(RunnerOption::Processes, "4")
                .unwrap(),
        ];

        runner
            .run(&descriptors, Some("tests/Override.php"))
            .await
            .unwrap();

        for command in runner.launcher().launched() {
            assert_eq!(command.positional(), ["tests/Override.php"]);
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_relative_root_with_working_dir() {
        use crate::config::ConfigFile;

        let tmp = tempdir().unwrap();
        let mut config = ConfigFile::default();
        config.repo.root = PathBuf::from("site");
        config.anchor_root(tmp.path());

        let bin_dir = tmp.path().join("site/vendor/bin");
        std::fs::create_dir_all(&bin_dir).unwrap();
        std::os::unix::fs::symlink("/bin/sh", bin_dir.join("paratest")).unwrap();

        let script = tmp.path().join("record.sh");
        std::fs::write(&script, "printf '%s\\n' \"$@\" > args.txt\n").unwrap();
        let work_dir = tmp.path().join("modules/custom");
        std::fs::create_dir_all(&work_dir).unwrap();

        let descriptor = TestDescriptor::new()
            .with_class(script.to_string_lossy())
            .with_path(work_dir.to_string_lossy());
        let runner = ParatestRunner::new(config.runner_binary(), config.report_location());

        let summary = runner.run(&[descriptor], None).await.unwrap();
        assert_eq!(summary.descriptors_run, 1);

        let report = config.report_location();
        assert!(report.file.is_file());

        let recorded = std::fs::read_to_string(work_dir.join("args.txt")).unwrap();
        let args: Vec<_> = recorded.lines().collect();
        let junit = args
            .iter()
            .position(|arg| *arg == "--log-junit")
            .and_then(|idx| args.get(idx + 1))
            .unwrap();
        assert!(PathBuf::from(junit).is_absolute());
        assert_eq!(PathBuf::from(junit), report.file);
    }

    #[test]
    fn test_plan_matches_descriptors() {
        let runner = ParatestRunner::new("vendor/bin/paratest", ReportLocation::new("reports"));
        let plan = runner.plan(&descriptors(2), None);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[1].program, PathBuf::from("vendor/bin/paratest"));
        assert_eq!(plan[1].positional(), ["Test1"]);
    }
}
