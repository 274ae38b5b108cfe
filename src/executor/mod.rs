//! Paratest execution engine
//!
//! Builds runner command lines and launches them one after another.

mod command;
mod launcher;
mod runner;

pub use command::ParatestCommand;
pub use runner::{ParatestRunner, RunError};
