//! Bounded concurrent replication engine
//!
//! This module runs one replication [`Job`] per image under a fixed concurrency
//! ceiling and folds every job's outcome into a single result.
//!
//! ## Components
//!
//! - [`JobRunner`] executes pull, tag and push for one job, stopping at the first
//!   failing call.
//! - [`Scheduler`] spawns one task per job and admits at most `limit` of them at a
//!   time through a semaphore. A failing job never stops its siblings.
//! - [`ResultAggregator`] stores exactly one outcome per job index and produces a
//!   [`CompositeFailure`] naming every failed index once all jobs are done.
//!
//! ## Usage Example
//!
//! ```no_run
//! use replika::concurrency::{Job, Scheduler};
//! use replika::registry::DockerCli;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let jobs = vec![
//!     Job::new("registry.example.com/library/nginx:1.27", vec![
//!         "mirror.example.com/library/nginx:1.27".to_string(),
//!     ])
//!     .with_pull(true)
//!     .with_push(true),
//! ];
//!
//! Scheduler::new(4)
//!     .run(jobs, Arc::new(DockerCli::builder().build()))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod job;
pub mod scheduler;

pub use aggregator::{CompositeFailure, ResultAggregator};
pub use job::{Job, JobError, JobRunner, Phase};
pub use scheduler::{DEFAULT_CONCURRENCY, Scheduler, normalize_concurrency};
