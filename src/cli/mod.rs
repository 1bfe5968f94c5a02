//! Command line interface module
//!
//! This module parses command-line arguments and runs the replication workflow.

pub mod args;
pub mod runner;

pub use args::Args;
pub use runner::Runner;
