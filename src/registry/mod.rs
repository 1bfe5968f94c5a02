//! Registry module for container registry interactions
//!
//! The replication engine only depends on the three operations of
//! [`RegistryClient`]. [`DockerCli`] implements them by shelling out to the
//! `docker` command line client.

pub mod docker;

pub use docker::{DockerCli, DockerCliBuilder};

use async_trait::async_trait;

/// Failure of a single pull, tag or push call
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}")]
    Exit {
        command: String,
        status: std::process::ExitStatus,
    },

    #[error("{0}")]
    Operation(String),
}

/// Image operations consumed by the job runner.
///
/// Each call resolves once the operation has finished on the registry side.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Pull `reference` into the local image store
    async fn pull(&self, reference: &str) -> Result<(), RegistryError>;

    /// Create `target` as a local alias of `source`
    async fn tag(&self, source: &str, target: &str) -> Result<(), RegistryError>;

    /// Push the local `reference` to its registry
    async fn push(&self, reference: &str) -> Result<(), RegistryError>;
}
