//! Replika Library
//!
//! Replicates container images from a source registry to one or more
//! destination registries, running many images concurrently under a fixed
//! limit and reporting every failure in one combined error.

pub mod cli;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod image;
pub mod logging;
pub mod registry;

pub use concurrency::{CompositeFailure, Job, JobError, Scheduler};
pub use error::{ReplikaError, Result};
pub use logging::Logger;
pub use registry::{DockerCli, RegistryClient, RegistryError};
