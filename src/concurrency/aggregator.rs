//! Per-job outcome collection
//!
//! Every job owns one write-once slot, so jobs finishing at the same time never
//! contend with each other.

use super::job::JobError;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Outcome of one job
pub type JobOutcome = Result<(), JobError>;

/// Collects exactly one outcome per job index
#[derive(Debug)]
pub struct ResultAggregator {
    slots: Vec<OnceLock<JobOutcome>>,
}

impl ResultAggregator {
    pub fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| OnceLock::new()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Store the outcome of job `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range or already has an outcome.
    pub fn record(&self, index: usize, outcome: JobOutcome) {
        let len = self.slots.len();
        let Some(slot) = self.slots.get(index) else {
            panic!("outcome recorded for job {} but only {} jobs were dispatched", index, len);
        };
        if slot.set(outcome).is_err() {
            panic!("outcome for job {} recorded twice", index);
        }
    }

    pub fn is_recorded(&self, index: usize) -> bool {
        self.slots
            .get(index)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Fold all outcomes into one result.
    ///
    /// Must only be called once every job has finished. A slot without an
    /// outcome is reported as an aborted job.
    pub fn finalize(self) -> Result<(), CompositeFailure> {
        let total_jobs = self.slots.len();
        let mut failures = BTreeMap::new();

        for (index, slot) in self.slots.into_iter().enumerate() {
            match slot.into_inner() {
                Some(Ok(())) => {}
                Some(Err(err)) => {
                    failures.insert(index, err);
                }
                None => {
                    failures.insert(
                        index,
                        JobError::Aborted {
                            reason: "no outcome was recorded".to_string(),
                        },
                    );
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(CompositeFailure {
                failures,
                total_jobs,
            })
        }
    }
}

/// Every failed job of a run, keyed by its position in the input list
#[derive(Debug)]
pub struct CompositeFailure {
    failures: BTreeMap<usize, JobError>,
    total_jobs: usize,
}

impl CompositeFailure {
    pub fn failures(&self) -> &BTreeMap<usize, JobError> {
        &self.failures
    }

    pub fn failed_indices(&self) -> Vec<usize> {
        self.failures.keys().copied().collect()
    }

    pub fn get(&self, index: usize) -> Option<&JobError> {
        self.failures.get(&index)
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total_jobs(&self) -> usize {
        self.total_jobs
    }
}

impl fmt::Display for CompositeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} jobs failed", self.failures.len(), self.total_jobs)?;
        for (index, err) in &self.failures {
            write!(f, "\n  #{}: {}", index, err)?;
        }
        Ok(())
    }
}

impl std::error::Error for CompositeFailure {}
