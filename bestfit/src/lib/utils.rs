pub use std::{
    collections::{HashMap, VecDeque},
    path::{Path, PathBuf},
    io::{BufRead, BufReader},
};
pub use thiserror::Error;
pub use itertools::Itertools;
pub use serde::Serialize;
pub use tracing::{debug, info, warn, Level};

/// The unit for measuring memory. Partition capacities and job
/// demands are both expressed in it.
pub type ByteSteps = usize;

/// Job numbers are assigned by the simulator, starting at 1.
pub type JobId = u32;

/// Partition ids run from 1 to N, in creation order.
pub type PartitionId = u32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Everything that can go wrong while driving a [`Simulator`](crate::Simulator).
///
/// Not finding room for a job is *not* an error: it is reported as
/// [`AllocationResult::NoFit`](crate::AllocationResult::NoFit) and the
/// job is queued.
pub enum SimError {
    #[error("Partition {index} has invalid size {size}")]
    InvalidPartitionSize {
        index:  usize,
        size:   ByteSteps,
    },
    #[error("At least one partition is needed")]
    NoPartitions,
    #[error("Invalid job size {0}")]
    InvalidJobSize(ByteSteps),
    #[error("Job {0} not found")]
    JobNotFound(JobId),
    /// The job was already placed, queued or deallocated, or was
    /// never submitted to this simulator.
    #[error("Job {0} is not awaiting placement")]
    StaleJob(JobId),
}
