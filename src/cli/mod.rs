//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Run configured paratest (parallel PHPUnit) suites
#[derive(Parser, Debug)]
#[command(name = "paratest-runner")]
#[command(version)]
#[command(about = "Run configured paratest suites and fail the build on test failures")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to ./paratest.yml and friends)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute all configured paratest descriptors
    #[command(visible_aliases = ["paratest", "cpr"])]
    Run(RunArgs),

    /// List configured descriptors and the commands they expand to
    List(ListArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path passed to paratest for every descriptor without a class
    #[arg(long)]
    pub test_path: Option<String>,

    /// Print the commands instead of running them
    #[arg(long)]
    pub dry_run: bool,

    /// Output format (table, json, json-pretty)
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Path passed to paratest for every descriptor without a class
    #[arg(long)]
    pub test_path: Option<String>,

    /// Output format (table, json, json-pretty)
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write an example configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "./paratest.yml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration
    Show {
        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Validate a configuration file
    Validate {
        /// File to validate (defaults to the discovered file)
        file: Option<PathBuf>,
    },

    /// Show supported environment variables
    Env,
}
