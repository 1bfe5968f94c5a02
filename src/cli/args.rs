//! Command-line argument parsing

use crate::concurrency::DEFAULT_CONCURRENCY;
use crate::config::ReplicationConfig;
use crate::image::parse_destinations;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "replika")]
#[command(about = "Replicate container images from a source registry to destination registries")]
#[command(version)]
pub struct Args {
    /// Image list file
    #[arg(
        long = "file",
        short = 'f',
        default_value = "IMAGES.txt",
        help = "File with one image name per line"
    )]
    pub file: String,

    /// Number of images replicated at once
    #[arg(
        long = "concurrency",
        short = 'c',
        allow_negative_numbers = true,
        help = "Images replicated concurrently [default: 5; values below 1 use the default]"
    )]
    pub concurrency: Option<i64>,

    /// Source registry
    #[arg(long = "src", default_value = "", help = "Source registry prefix")]
    pub src: String,

    /// Destination registries
    #[arg(
        long = "dst",
        default_value = "",
        help = "Destination registry prefixes, comma separated"
    )]
    pub dst: String,

    #[arg(long = "pull", help = "Pull images from the source registry")]
    pub pull: bool,

    #[arg(long = "push", help = "Push images to the destination registries")]
    pub push: bool,

    /// Docker config directory
    #[arg(
        long = "docker-config",
        help = "Override the docker config directory"
    )]
    pub docker_config: Option<PathBuf>,

    #[arg(
        long = "dry-run",
        short = 'n',
        help = "List the planned jobs without running docker"
    )]
    pub dry_run: bool,

    #[arg(long = "verbose", short = 'v', help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long = "quiet",
        short = 'q',
        conflicts_with = "verbose",
        help = "Only print errors"
    )]
    pub quiet: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Fill unset values from environment variables
    pub fn from_env(self) -> Self {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Fill unset values through `lookup`; flags given on the command line win
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.docker_config.is_none() {
            self.docker_config = lookup("REPLIKA_DOCKER_CONFIG")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from);
        }

        if self.concurrency.is_none() {
            self.concurrency = lookup("REPLIKA_CONCURRENCY").and_then(|c| c.trim().parse().ok());
        }

        if let Some(val) = lookup("REPLIKA_VERBOSE") {
            let val = val.trim();
            if (val.to_lowercase() == "true" || val == "1") && !self.quiet {
                self.verbose = true;
            }
        }

        self
    }

    pub fn to_config(&self) -> ReplicationConfig {
        ReplicationConfig {
            image_file: self.file.clone(),
            source_registry: self.src.trim().to_string(),
            destination_registries: parse_destinations(&self.dst),
            pull: self.pull,
            push: self.push,
            concurrency: self.concurrency.unwrap_or(DEFAULT_CONCURRENCY as i64),
            docker_config: self.docker_config.clone(),
            dry_run: self.dry_run,
        }
    }
}
