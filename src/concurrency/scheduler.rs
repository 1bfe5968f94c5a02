//! Bounded scheduler
//!
//! Spawns one task per job and lets at most `limit` of them run at once. Jobs
//! wait for an admission permit, run through the [`JobRunner`] and record their
//! outcome under their input index. The scheduler returns once every task has
//! finished.

use super::aggregator::{CompositeFailure, ResultAggregator};
use super::job::{Job, JobError, JobRunner};
use crate::logging::Logger;
use crate::registry::RegistryClient;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Concurrency used when the configured limit is below one
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Clamp a user supplied concurrency to a usable permit count
pub fn normalize_concurrency(limit: i64) -> usize {
    if limit < 1 {
        DEFAULT_CONCURRENCY
    } else {
        usize::try_from(limit).map_or(DEFAULT_CONCURRENCY, |limit| {
            limit.min(Semaphore::MAX_PERMITS)
        })
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    limit: usize,
    logger: Logger,
}

impl Scheduler {
    /// Scheduler admitting `limit` concurrent jobs; values below one fall back
    /// to [`DEFAULT_CONCURRENCY`].
    pub fn new(limit: i64) -> Self {
        Self {
            limit: normalize_concurrency(limit),
            logger: Logger::new_quiet(),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Run every job and wait for all of them.
    ///
    /// A failing job never stops the others. The returned error lists every
    /// failed job by its position in `jobs`.
    pub async fn run(
        &self,
        jobs: Vec<Job>,
        client: Arc<dyn RegistryClient>,
    ) -> Result<(), CompositeFailure> {
        let total = jobs.len();
        let semaphore = Arc::new(Semaphore::new(self.limit));
        let aggregator = Arc::new(ResultAggregator::new(total));
        let runner = JobRunner::new(client, self.logger.clone());

        self.logger.info(&format!(
            "Replicating {} images with {} concurrent jobs",
            total, self.limit
        ));

        let handles: Vec<_> = jobs
            .into_iter()
            .enumerate()
            .map(|(index, job)| {
                let semaphore = Arc::clone(&semaphore);
                let aggregator = Arc::clone(&aggregator);
                let runner = runner.clone();
                let logger = self.logger.clone();

                tokio::spawn(async move {
                    let outcome = match semaphore.acquire_owned().await {
                        Ok(_permit) => {
                            logger.detail(&format!("Job #{} admitted: {}", index, job));
                            runner.run(&job).await
                        }
                        Err(e) => Err(JobError::Aborted {
                            reason: format!("admission failed: {}", e),
                        }),
                    };
                    if let Err(err) = &outcome {
                        report_failure(&logger, index, err);
                    }
                    aggregator.record(index, outcome);
                })
            })
            .collect();

        for (index, joined) in join_all(handles).await.into_iter().enumerate() {
            if let Err(e) = joined {
                if !aggregator.is_recorded(index) {
                    let err = JobError::Aborted {
                        reason: format!("task terminated: {}", e),
                    };
                    report_failure(&self.logger, index, &err);
                    aggregator.record(index, Err(err));
                }
            }
        }

        // Every task has completed, so its clone of the aggregator is gone.
        let Some(aggregator) = Arc::into_inner(aggregator) else {
            unreachable!("result aggregator still shared after all jobs finished");
        };
        aggregator.finalize()
    }
}

fn report_failure(logger: &Logger, index: usize, err: &JobError) {
    logger.error(&format!("Job #{}: {}", index, err));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_concurrency() {
        assert_eq!(normalize_concurrency(0), DEFAULT_CONCURRENCY);
        assert_eq!(normalize_concurrency(-3), DEFAULT_CONCURRENCY);
        assert_eq!(normalize_concurrency(1), 1);
        assert_eq!(normalize_concurrency(16), 16);
    }

    #[test]
    fn test_scheduler_limit() {
        assert_eq!(Scheduler::new(0).limit(), 5);
        assert_eq!(Scheduler::new(2).limit(), 2);
    }
}
