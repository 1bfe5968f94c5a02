//! Runner driving one replication run from parsed arguments

use crate::cli::args::Args;
use crate::concurrency::Scheduler;
use crate::config::{DockerConfigDir, ReplicationConfig};
use crate::error::Result;
use crate::image::{ImageList, build_jobs};
use crate::logging::Logger;
use crate::registry::{DockerCli, RegistryClient};
use std::sync::Arc;

pub struct Runner {
    config: ReplicationConfig,
    output: Logger,
}

impl Runner {
    pub fn new(args: Args) -> Self {
        let output = if args.quiet {
            Logger::new_quiet()
        } else {
            Logger::new(args.verbose)
        };

        Self {
            config: args.to_config(),
            output,
        }
    }

    pub fn from_config(config: ReplicationConfig, output: Logger) -> Self {
        Self { config, output }
    }

    pub fn output(&self) -> &Logger {
        &self.output
    }

    pub async fn run(&self) -> Result<()> {
        self.output.section("Replika");
        self.config.validate()?;

        // Held until the run ends; a generated directory is removed on drop.
        let docker_config =
            DockerConfigDir::resolve(self.config.docker_config.as_deref(), &self.output)?;
        if let Some(dir) = &docker_config {
            self.output
                .step(&format!("Using docker config directory {}", dir.path().display()));
        }

        let client = DockerCli::builder()
            .with_config_dir(docker_config.as_ref().map(|dir| dir.path().to_path_buf()))
            .build();

        self.replicate(Arc::new(client)).await
    }

    /// Load the image list and replicate every image through `client`
    pub async fn replicate(&self, client: Arc<dyn RegistryClient>) -> Result<()> {
        let images = ImageList::load(&self.config.image_file)?;
        self.output.info(&format!(
            "Loaded {} images from {}",
            images.len(),
            self.config.image_file
        ));
        if images.is_empty() {
            self.output.warning("Image list is empty, nothing to replicate");
        }
        if !self.config.source_registry.is_empty() {
            self.output
                .detail(&format!("Source registry: {}", self.config.source_registry));
        }
        for registry in &self.config.destination_registries {
            self.output.detail(&format!("Destination registry: {}", registry));
        }
        if self.config.push && self.config.destination_registries.is_empty() {
            self.output
                .warning("No destination registries given, nothing will be tagged or pushed");
        }

        let jobs = build_jobs(
            images.names(),
            &self.config.source_registry,
            &self.config.destination_registries,
            self.config.pull,
            self.config.push,
        );

        if self.config.dry_run {
            let planned: Vec<String> = jobs.iter().map(ToString::to_string).collect();
            self.output.list("Planned jobs", &planned);
            self.output.info("Dry run mode - skipping docker operations");
            return Ok(());
        }

        let scheduler = Scheduler::new(self.config.concurrency).with_logger(self.output.clone());
        let total = jobs.len();
        let result = scheduler.run(jobs, client).await;
        let elapsed = self.output.format_duration(self.output.elapsed());

        match result {
            Ok(()) => {
                self.output
                    .success(&format!("Replicated {} images in {}", total, elapsed));
                Ok(())
            }
            Err(failure) => {
                let items: Vec<String> = failure
                    .failures()
                    .iter()
                    .map(|(index, err)| format!("#{} {}", index, err))
                    .collect();
                self.output.summary(
                    &format!("{} of {} images failed ({})", failure.len(), total, elapsed),
                    &items,
                );
                Err(failure.into())
            }
        }
    }
}
