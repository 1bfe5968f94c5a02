//! Image list and reference handling
//!
//! Turns the image list file and the registry flags into the [`Job`]s the
//! scheduler runs.

pub mod list;
pub mod reference;

pub use list::ImageList;
pub use reference::{join_reference, parse_destinations};

use crate::concurrency::Job;

/// One job per image name, with source and destination references resolved
pub fn build_jobs(
    names: &[String],
    source_registry: &str,
    destination_registries: &[String],
    pull: bool,
    push: bool,
) -> Vec<Job> {
    names
        .iter()
        .map(|name| {
            let destinations = destination_registries
                .iter()
                .map(|registry| join_reference(registry, name))
                .collect();
            Job::new(join_reference(source_registry, name), destinations)
                .with_pull(pull)
                .with_push(push)
        })
        .collect()
}
