// Implementation of RegistryClient on top of the docker command line client.
// Every operation spawns `docker [--config <dir>] <args>` and waits for it;
// stdout is discarded and stderr is passed through to the terminal.

use crate::registry::{RegistryClient, RegistryError};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

pub struct DockerCliBuilder {
    binary: String,
    config_dir: Option<PathBuf>,
}

impl Default for DockerCliBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DockerCliBuilder {
    pub fn new() -> Self {
        Self {
            binary: "docker".to_string(),
            config_dir: None,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_config_dir(mut self, config_dir: Option<PathBuf>) -> Self {
        self.config_dir = config_dir;
        self
    }

    pub fn build(self) -> DockerCli {
        DockerCli {
            binary: self.binary,
            config_dir: self.config_dir,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
    config_dir: Option<PathBuf>,
}

impl DockerCli {
    pub fn builder() -> DockerCliBuilder {
        DockerCliBuilder::new()
    }

    /// Full argument list for a docker invocation, global options first
    fn arguments(&self, args: &[&str]) -> Vec<String> {
        let mut full = Vec::with_capacity(args.len() + 2);
        if let Some(dir) = &self.config_dir {
            full.push("--config".to_string());
            full.push(dir.display().to_string());
        }
        full.extend(args.iter().map(|arg| arg.to_string()));
        full
    }

    async fn execute(&self, args: &[&str]) -> Result<(), RegistryError> {
        let arguments = self.arguments(args);
        let command = format!("{} {}", self.binary, arguments.join(" "));

        let status = Command::new(&self.binary)
            .args(&arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| RegistryError::Spawn {
                command: command.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(RegistryError::Exit { command, status })
        }
    }
}

#[async_trait]
impl RegistryClient for DockerCli {
    async fn pull(&self, reference: &str) -> Result<(), RegistryError> {
        self.execute(&["pull", reference]).await
    }

    async fn tag(&self, source: &str, target: &str) -> Result<(), RegistryError> {
        self.execute(&["tag", source, target]).await
    }

    async fn push(&self, reference: &str) -> Result<(), RegistryError> {
        self.execute(&["push", reference]).await
    }
}
