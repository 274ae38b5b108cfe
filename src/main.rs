//! paratest-runner - run configured paratest suites from a build pipeline
//!
//! Reads a list of test descriptors from a project configuration file and
//! invokes the parallel PHPUnit runner (`paratest`) once per descriptor,
//! strictly in order. All runs share one JUnit report file. The first
//! descriptor whose runner exits non-zero fails the build; later descriptors
//! are not run.
//!
//! ## Usage
//!
//! ```bash
//! # Run every configured descriptor
//! paratest-runner run
//!
//! # Run against a single file instead of each descriptor's path
//! paratest-runner run --test-path tests/phpunit/ExampleTest.php
//!
//! # Show what would run
//! paratest-runner list
//!
//! # Create a starter configuration
//! paratest-runner config init
//! ```

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

mod cli;
mod config;
mod executor;
mod models;
mod output;
mod utils;

use cli::Args;
use config::{ConfigFile, EnvConfig};
use executor::{ParatestRunner, RunError};
use output::{OutputFormat, ResultFormatter};
use utils::{init_logger, LogLevel};

/// Exit status for configuration and usage errors
const EXIT_CONFIG_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let env = EnvConfig::load();

    init_logger(LogLevel::resolve(args.verbose, env.log_level.as_deref()));

    match dispatch(args, env).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            let code = e
                .downcast_ref::<RunError>()
                .map(|run_error| run_error.exit_code() as u8)
                .unwrap_or(EXIT_CONFIG_ERROR);
            ExitCode::from(code)
        }
    }
}

async fn dispatch(args: Args, env: EnvConfig) -> Result<()> {
    match args.command {
        cli::Command::Run(run_args) => {
            let config = load_config(args.config.as_deref(), &env, run_args.test_path)?;
            run_paratest(&config, run_args.dry_run, &run_args.format).await?;
        }
        cli::Command::List(list_args) => {
            let config = load_config(args.config.as_deref(), &env, list_args.test_path)?;
            list_descriptors(&config, &list_args.format)?;
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args, args.config.as_deref(), &env)?;
        }
    }

    Ok(())
}

fn load_config(
    explicit: Option<&std::path::Path>,
    env: &EnvConfig,
    test_path: Option<String>,
) -> Result<ConfigFile> {
    let mut config = ConfigFile::resolve(explicit, env)?;
    if let Some(path) = test_path {
        config.set_test_path(path);
    }
    Ok(config)
}

fn output_format(format: &str) -> Result<OutputFormat> {
    OutputFormat::from_str(format)
        .ok_or_else(|| anyhow::anyhow!("Unknown output format: {format}"))
}

async fn run_paratest(config: &ConfigFile, dry_run: bool, format: &str) -> Result<()> {
    let formatter = ResultFormatter::new(output_format(format)?);
    let runner = ParatestRunner::new(config.runner_binary(), config.report_location());
    let descriptors = config.descriptors();

    if dry_run {
        let plan = runner.plan(descriptors, config.fallback_path());
        println!("{}", formatter.format_plan(descriptors, &plan));
        return Ok(());
    }

    if let Some(path) = config.fallback_path() {
        info!("Using test path override: {}", path);
    }

    let summary = runner.run(descriptors, config.fallback_path()).await?;
    println!("{}", formatter.format_summary(&summary));

    Ok(())
}

fn list_descriptors(config: &ConfigFile, format: &str) -> Result<()> {
    let formatter = ResultFormatter::new(output_format(format)?);
    let runner = ParatestRunner::new(config.runner_binary(), config.report_location());
    let descriptors = config.descriptors();
    let plan = runner.plan(descriptors, config.fallback_path());

    println!("{}", formatter.format_plan(descriptors, &plan));
    println!("\nReport file: {}", runner.report().file.display());

    Ok(())
}

fn manage_config(
    args: cli::ConfigArgs,
    explicit: Option<&std::path::Path>,
    env: &EnvConfig,
) -> Result<()> {
    match args.action {
        cli::ConfigAction::Init { output, force } => {
            if output.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {}. Use --force to overwrite.",
                    output.display()
                );
            }

            ConfigFile::example().save(&output)?;
            println!("✓ Configuration file created: {}", output.display());
            println!("\nEdit the file to describe your paratest runs.");
        }

        cli::ConfigAction::Show { format } => {
            let config = ConfigFile::resolve(explicit, env)?;
            let output = if format == "json" {
                serde_json::to_string_pretty(&config)?
            } else {
                serde_yaml::to_string(&config)?
            };
            println!("{output}");

            if env.has_any() {
                println!();
                env.print_summary();
            }
        }

        cli::ConfigAction::Validate { file } => {
            let path = file
                .or_else(|| explicit.map(|p| p.to_path_buf()))
                .or_else(|| env.config_file.clone())
                .or_else(ConfigFile::find)
                .ok_or_else(|| anyhow::anyhow!("No configuration file found"))?;

            match ConfigFile::load(&path) {
                Ok(config) => {
                    println!("✓ Configuration file is valid: {}", path.display());
                    println!("  {} paratest descriptor(s)", config.descriptors().len());
                }
                Err(e) => {
                    println!("✗ Configuration file is invalid: {}", path.display());
                    println!("  Error: {e:#}");
                    return Err(e);
                }
            }
        }

        cli::ConfigAction::Env => {
            config::env::print_env_help();
        }
    }

    Ok(())
}
