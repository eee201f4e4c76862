use crate::utils::*;
use crate::{Job, PartitionTable};

/// Outcome of a single best-fit search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AllocationResult {
    Allocated { partition: PartitionId },
    /// No free partition is large enough. Not an error: the job
    /// is meant to wait.
    NoFit,
}

/// A waiting job that found a home during a retry pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub job:        JobId,
    pub partition:  PartitionId,
}

/// Outcome of a successful deallocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Deallocation {
    /// The partition that was freed.
    pub partition:  PartitionId,
    /// Waiting jobs placed by the retry pass that followed, in queue order.
    pub placed:     Vec<Placement>,
}

/// The whole simulation state: partitions, waiting queue and ledger of
/// deallocated jobs. It is owned by the caller and every operation runs
/// to completion before the next one starts.
#[derive(Clone, Debug)]
pub struct Simulator {
    pub(crate) table:   PartitionTable,
    pub(crate) waiting: VecDeque<Job>,
    pub(crate) ledger:  Vec<Job>,
    // Submitted jobs that have not been placed or queued yet.
    fresh:              HashMap<JobId, ByteSteps>,
    next_job:           JobId,
}

impl Simulator {
    /// Sets up a simulator whose partitions have the given sizes,
    /// with ids 1..N in that order.
    pub fn new(sizes: &[ByteSteps]) -> Result<Self, SimError> {
        let table = PartitionTable::new(sizes)?;
        info!(partitions = table.len(), "Partition table initialized");

        Ok(Self {
            table,
            waiting:    VecDeque::new(),
            ledger:     vec![],
            fresh:      HashMap::new(),
            next_job:   1,
        })
    }

    pub fn table(&self) -> &PartitionTable { &self.table }

    /// Jobs still waiting for a partition, in arrival order.
    pub fn waiting(&self) -> impl Iterator<Item = &Job> { self.waiting.iter() }

    /// Deallocated jobs, oldest first.
    pub fn ledger(&self) -> &[Job] { &self.ledger }

    /// Creates a new job of the given size. Its number is the next one in
    /// line; a rejected size does not consume a number.
    ///
    /// The job is not placed anywhere yet: see [`allocate`](Self::allocate)
    /// and [`admit`](Self::admit).
    pub fn submit_job(&mut self, size: ByteSteps) -> Result<Job, SimError> {
        if size == 0 {
            return Err(SimError::InvalidJobSize(size));
        }
        let job = Job::new(self.next_job, size);
        self.next_job += 1;
        self.fresh.insert(job.number(), size);

        Ok(job)
    }

    /// Places `job` according to best fit. On [`AllocationResult::NoFit`]
    /// nothing changes; queueing the job is the caller's business.
    ///
    /// Only freshly submitted jobs are accepted. A job that already sits in
    /// a partition, waits in the queue or was deallocated is refused with
    /// [`SimError::StaleJob`], and so is a job from another simulator.
    pub fn allocate(&mut self, job: Job) -> Result<AllocationResult, SimError> {
        self.ensure_fresh(&job)?;
        let res = self.place(job);
        if let AllocationResult::Allocated { .. } = res {
            self.fresh.remove(&job.number());
        }

        Ok(res)
    }

    fn ensure_fresh(&self, job: &Job) -> Result<(), SimError> {
        match self.fresh.get(&job.number()) {
            Some(&size) if size == job.size()   => Ok(()),
            _                                   => {
                warn!(job = job.number(), "Refusing stale job");
                Err(SimError::StaleJob(job.number()))
            },
        }
    }

    // The best-fit step proper, shared by fresh allocations and
    // the retry pass.
    fn place(&mut self, job: Job) -> AllocationResult {
        match self.table.best_fit(&job) {
            Some(id) => {
                // `best_fit` only yields ids of existing partitions.
                if let Some(p) = self.table.get_mut(id) {
                    p.occupy(&job);
                }
                debug!(job = job.number, size = job.size, partition = id, "Best fit found");

                AllocationResult::Allocated { partition: id }
            },
            None    => {
                debug!(job = job.number, size = job.size, "No partition fits");

                AllocationResult::NoFit
            },
        }
    }

    /// Allocates `job`, sending it to the back of the waiting queue
    /// if no partition fits. Refuses stale jobs like
    /// [`allocate`](Self::allocate).
    pub fn admit(&mut self, job: Job) -> Result<AllocationResult, SimError> {
        let res = self.allocate(job)?;
        match res {
            AllocationResult::Allocated { partition } => {
                info!(job = job.number, partition, "Job allocated");
            },
            AllocationResult::NoFit => {
                info!(job = job.number, size = job.size, "Job added to waiting queue");
                self.fresh.remove(&job.number);
                self.waiting.push_back(job);
            },
        }

        Ok(res)
    }

    /// Frees the partition holding job number `job`, records the job in
    /// the ledger and then gives every waiting job one more chance.
    ///
    /// Fails only if no partition holds `job`, in which case nothing
    /// is touched.
    pub fn deallocate(&mut self, job: JobId) -> Result<Deallocation, SimError> {
        let Some(p) = self.table.holder_of_mut(job) else {
            warn!(job, "Deallocation of unknown job");
            return Err(SimError::JobNotFound(job));
        };
        let partition = p.id();
        if let Some(freed) = p.release() {
            self.ledger.push(freed);
        }
        info!(job, partition, "Job deallocated");
        let placed = self.retry_waiting();

        Ok(Deallocation { partition, placed })
    }

    /// One sequential sweep over the waiting queue, in arrival order.
    /// Each job is tried against the table as the sweep has left it so
    /// far. Jobs that still do not fit keep their relative order.
    pub(crate) fn retry_waiting(&mut self) -> Vec<Placement> {
        let mut placed = vec![];
        if self.waiting.is_empty() { return placed; }

        let mut remaining = VecDeque::with_capacity(self.waiting.len());
        while let Some(j) = self.waiting.pop_front() {
            match self.place(j) {
                AllocationResult::Allocated { partition } => {
                    info!(job = j.number, partition, "Waiting job allocated");
                    placed.push(Placement { job: j.number, partition });
                },
                AllocationResult::NoFit => { remaining.push_back(j); },
            }
        }
        self.waiting = remaining;

        placed
    }
}
