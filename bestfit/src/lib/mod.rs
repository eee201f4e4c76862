//! Welcome to `bestfit`!
//!
//! A simulator of fixed-partition memory management. Memory is split
//! once, at startup, into a table of partitions whose sizes never change.
//! Jobs arrive one at a time and are placed into the free partition that
//! wastes the least space. Jobs that fit nowhere wait in a queue until
//! some deallocation makes room for them.

mod partition;
pub mod utils;
pub mod engine;
pub mod metrics;
pub mod io;
pub mod display;
pub mod console;
pub mod logging;

pub use crate::utils::*;
pub use crate::partition::PartitionTable;
pub use crate::engine::{AllocationResult, Deallocation, Placement, Simulator};
pub use crate::metrics::{Metrics, Snapshot};

/// A process requesting memory. The [`number`](Job::number) is handed out
/// by the [`Simulator`] in submission order, starting at 1, and is never
/// reused.
///
/// Over its lifetime a job is found in exactly one of three places: inside
/// a [`Partition`], in the waiting queue, or (once deallocated) in the
/// ledger.
///
/// Jobs can only be obtained from [`Simulator::submit_job`], so a job
/// always has a positive size and a number this simulator handed out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Job {
    number: JobId,
    size:   ByteSteps,
}

impl Job {
    pub(crate) fn new(number: JobId, size: ByteSteps) -> Self {
        Self { number, size }
    }

    pub fn number(&self) -> JobId { self.number }

    pub fn size(&self) -> ByteSteps { self.size }
}

/// What a [`Partition`] currently holds.
///
/// Free partitions carry no job data at all, so a "free but sized"
/// partition cannot be expressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Occupancy {
    Free,
    Occupied {
        job:        JobId,
        job_size:   ByteSteps,
    },
}

/// A fixed-size, fixed-identity block of the simulated memory pool.
///
/// Only the [`occupancy`](Partition::occupancy) ever changes, and only
/// through the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Partition {
    id:         PartitionId,
    size:       ByteSteps,
    occupancy:  Occupancy,
}

impl Partition {
    pub(crate) fn new(id: PartitionId, size: ByteSteps) -> Self {
        Self {
            id,
            size,
            occupancy:  Occupancy::Free,
        }
    }

    pub fn id(&self) -> PartitionId { self.id }

    pub fn size(&self) -> ByteSteps { self.size }

    pub fn occupancy(&self) -> Occupancy { self.occupancy }

    pub fn is_free(&self) -> bool {
        matches!(self.occupancy, Occupancy::Free)
    }

    /// The job held here, if any.
    pub fn job(&self) -> Option<Job> {
        match self.occupancy {
            Occupancy::Free                         => None,
            Occupancy::Occupied { job, job_size }   => Some(Job::new(job, job_size)),
        }
    }

    /// Space wasted inside the partition. Zero when free.
    pub fn internal_fragment(&self) -> ByteSteps {
        match self.occupancy {
            Occupancy::Free                         => 0,
            Occupancy::Occupied { job_size, .. }    => self.size - job_size,
        }
    }

    /// Returns `true` if `job` may be placed here: the partition
    /// is free and large enough.
    pub fn fits(&self, job: &Job) -> bool {
        self.is_free() && self.size >= job.size
    }

    pub(crate) fn occupy(&mut self, job: &Job) {
        debug_assert!(self.fits(job), "Occupying an unfit partition!");
        self.occupancy = Occupancy::Occupied {
            job:        job.number,
            job_size:   job.size,
        };
    }

    /// Resets the partition, handing back whatever it held.
    pub(crate) fn release(&mut self) -> Option<Job> {
        let held = self.job();
        self.occupancy = Occupancy::Free;

        held
    }
}
