//! Replication jobs and the runner that executes them

use crate::logging::Logger;
use crate::registry::{RegistryClient, RegistryError};
use std::fmt;
use std::sync::Arc;

/// Replication work for one image.
///
/// A job is never modified once built; the scheduler moves each job into the
/// task that runs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    source: String,
    destinations: Vec<String>,
    pull: bool,
    push: bool,
}

impl Job {
    pub fn new(source: impl Into<String>, destinations: Vec<String>) -> Self {
        Self {
            source: source.into(),
            destinations,
            pull: false,
            push: false,
        }
    }

    pub fn with_pull(mut self, pull: bool) -> Self {
        self.pull = pull;
        self
    }

    pub fn with_push(mut self, push: bool) -> Self {
        self.push = push;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn destinations(&self) -> &[String] {
        &self.destinations
    }

    pub fn pull(&self) -> bool {
        self.pull
    }

    pub fn push(&self) -> bool {
        self.push
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)?;
        if !self.destinations.is_empty() {
            write!(f, " -> {}", self.destinations.join(", "))?;
        }
        match (self.pull, self.push) {
            (true, true) => write!(f, " [pull, push]"),
            (true, false) => write!(f, " [pull]"),
            (false, true) => write!(f, " [push]"),
            (false, false) => Ok(()),
        }
    }
}

/// Stage of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Pull,
    Tag,
    Push,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Labels share one width so status lines line up.
        let label = match self {
            Phase::Pull => "PULL",
            Phase::Tag => " TAG",
            Phase::Push => "PUSH",
        };
        f.write_str(label)
    }
}

/// Why a job did not complete
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("pull {reference} failed: {cause}")]
    Pull {
        reference: String,
        #[source]
        cause: RegistryError,
    },

    #[error("tag {image} as {destination} failed: {cause}")]
    Tag {
        image: String,
        destination: String,
        #[source]
        cause: RegistryError,
    },

    #[error("push {reference} failed: {cause}")]
    Push {
        reference: String,
        #[source]
        cause: RegistryError,
    },

    #[error("job aborted: {reason}")]
    Aborted { reason: String },
}

impl JobError {
    /// Phase that failed, `None` when the job was aborted
    pub fn phase(&self) -> Option<Phase> {
        match self {
            JobError::Pull { .. } => Some(Phase::Pull),
            JobError::Tag { .. } => Some(Phase::Tag),
            JobError::Push { .. } => Some(Phase::Push),
            JobError::Aborted { .. } => None,
        }
    }

    /// Reference the failing call was made for
    pub fn reference(&self) -> Option<&str> {
        match self {
            JobError::Pull { reference, .. } | JobError::Push { reference, .. } => {
                Some(reference)
            }
            JobError::Tag { destination, .. } => Some(destination),
            JobError::Aborted { .. } => None,
        }
    }
}

/// Executes the pull, tag and push sequence of a single job
#[derive(Clone)]
pub struct JobRunner {
    client: Arc<dyn RegistryClient>,
    logger: Logger,
}

impl JobRunner {
    pub fn new(client: Arc<dyn RegistryClient>, logger: Logger) -> Self {
        Self { client, logger }
    }

    /// Run `job` to completion or to its first failing call.
    ///
    /// Every destination is tagged before any push starts, because a push
    /// needs the local tag to exist.
    pub async fn run(&self, job: &Job) -> Result<(), JobError> {
        if job.pull() {
            self.logger.phase_start(Phase::Pull, job.source());
            self.client
                .pull(job.source())
                .await
                .map_err(|cause| JobError::Pull {
                    reference: job.source().to_string(),
                    cause,
                })?;
            self.logger.phase_done(Phase::Pull, job.source());
        }

        for destination in job.destinations() {
            self.logger.phase_start(Phase::Tag, destination);
            self.client
                .tag(job.source(), destination)
                .await
                .map_err(|cause| JobError::Tag {
                    image: job.source().to_string(),
                    destination: destination.clone(),
                    cause,
                })?;
            self.logger.phase_done(Phase::Tag, destination);
        }

        if job.push() {
            for destination in job.destinations() {
                self.logger.phase_start(Phase::Push, destination);
                self.client
                    .push(destination)
                    .await
                    .map_err(|cause| JobError::Push {
                        reference: destination.clone(),
                        cause,
                    })?;
                self.logger.phase_done(Phase::Push, destination);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedClient {
        calls: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    impl ScriptedClient {
        fn failing_on(call: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on: Some(call.to_string()),
            }
        }

        fn record(&self, call: String) -> Result<(), RegistryError> {
            let failed = self.fail_on.as_deref() == Some(call.as_str());
            self.calls.lock().unwrap().push(call);
            if failed {
                Err(RegistryError::Operation("denied".to_string()))
            } else {
                Ok(())
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RegistryClient for ScriptedClient {
        async fn pull(&self, reference: &str) -> Result<(), RegistryError> {
            self.record(format!("pull {}", reference))
        }

        async fn tag(&self, source: &str, target: &str) -> Result<(), RegistryError> {
            self.record(format!("tag {} {}", source, target))
        }

        async fn push(&self, reference: &str) -> Result<(), RegistryError> {
            self.record(format!("push {}", reference))
        }
    }

    fn job() -> Job {
        Job::new("src/app", vec!["x/app".to_string(), "y/app".to_string()])
            .with_pull(true)
            .with_push(true)
    }

    fn runner(client: &Arc<ScriptedClient>) -> JobRunner {
        JobRunner::new(client.clone(), Logger::new_quiet())
    }

    #[tokio::test]
    async fn test_runs_phases_in_order() {
        let client = Arc::new(ScriptedClient::default());
        runner(&client).run(&job()).await.unwrap();

        assert_eq!(
            client.calls(),
            vec![
                "pull src/app",
                "tag src/app x/app",
                "tag src/app y/app",
                "push x/app",
                "push y/app",
            ]
        );
    }

    #[tokio::test]
    async fn test_pull_and_push_are_optional() {
        let client = Arc::new(ScriptedClient::default());
        let job = Job::new("src/app", vec!["x/app".to_string()]);
        runner(&client).run(&job).await.unwrap();

        assert_eq!(client.calls(), vec!["tag src/app x/app"]);
    }

    #[tokio::test]
    async fn test_pull_failure_skips_tag_and_push() {
        let client = Arc::new(ScriptedClient::failing_on("pull src/app"));
        let err = runner(&client).run(&job()).await.unwrap_err();

        assert_eq!(err.phase(), Some(Phase::Pull));
        assert_eq!(err.reference(), Some("src/app"));
        assert_eq!(client.calls(), vec!["pull src/app"]);
    }

    #[tokio::test]
    async fn test_tag_failure_stops_remaining_destinations() {
        let client = Arc::new(ScriptedClient::failing_on("tag src/app x/app"));
        let err = runner(&client).run(&job()).await.unwrap_err();

        assert!(matches!(
            &err,
            JobError::Tag { image, destination, .. } if image == "src/app" && destination == "x/app"
        ));
        assert_eq!(client.calls(), vec!["pull src/app", "tag src/app x/app"]);
    }

    #[tokio::test]
    async fn test_push_failure_names_destination() {
        let client = Arc::new(ScriptedClient::failing_on("push x/app"));
        let err = runner(&client).run(&job()).await.unwrap_err();

        assert_eq!(err.phase(), Some(Phase::Push));
        assert_eq!(err.reference(), Some("x/app"));
        assert!(!client.calls().contains(&"push y/app".to_string()));
    }

    #[test]
    fn test_job_display() {
        assert_eq!(job().to_string(), "src/app -> x/app, y/app [pull, push]");
        assert_eq!(Job::new("src/app", Vec::new()).to_string(), "src/app");
    }

    #[test]
    fn test_error_display_names_reference_and_cause() {
        let err = JobError::Tag {
            image: "src/app".to_string(),
            destination: "x/app".to_string(),
            cause: RegistryError::Operation("no such image".to_string()),
        };
        assert_eq!(err.to_string(), "tag src/app as x/app failed: no such image");
    }
}
