pub use std::collections::HashSet;
pub use bestfit::*;
pub use bestfit::io::{Op, Outcome};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A broken promise of the allocator, caught while looking at
/// a [`Snapshot`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("Partition at position {position} has id {found}")]
    BadId {
        position:   usize,
        found:      PartitionId,
    },
    #[error("Partition {0} has zero size")]
    ZeroSized(PartitionId),
    #[error("Partition {partition} (size {size}) holds job {job} of size {job_size}")]
    Overfull {
        partition:  PartitionId,
        size:       ByteSteps,
        job:        JobId,
        job_size:   ByteSteps,
    },
    #[error("Job {0} is held by more than one partition")]
    DuplicateJob(JobId),
    #[error("Job {0} is both placed and waiting")]
    PlacedAndWaiting(JobId),
    #[error("Waiting job {job} fits free partition {partition}")]
    Starved {
        job:        JobId,
        partition:  PartitionId,
    },
    #[error("Reported metrics disagree with the partitions")]
    MetricsDrift,
}

/// Checks every invariant a [`Snapshot`] must satisfy:
///
/// - ids run 1..N and every size is positive,
/// - no job overflows its partition,
/// - no job number is held twice, or is held and waiting at once,
/// - no waiting job fits a free partition (the retry pass that
///   follows every deallocation guarantees this),
/// - the reported metrics match the partitions.
pub fn check(snap: &Snapshot) -> Result<(), Violation> {
    let mut placed: HashSet<JobId> = HashSet::new();
    for (position, p) in snap.partitions.iter().enumerate() {
        if p.id() as usize != position + 1 {
            return Err(Violation::BadId { position, found: p.id() });
        }
        if p.size() == 0 {
            return Err(Violation::ZeroSized(p.id()));
        }
        if let Some(j) = p.job() {
            if j.size() > p.size() || j.size() == 0 {
                return Err(Violation::Overfull {
                    partition:  p.id(),
                    size:       p.size(),
                    job:        j.number(),
                    job_size:   j.size(),
                });
            }
            if !placed.insert(j.number()) {
                return Err(Violation::DuplicateJob(j.number()));
            }
        }
    }

    for j in &snap.waiting_queue {
        if placed.contains(&j.number()) {
            return Err(Violation::PlacedAndWaiting(j.number()));
        }
        if let Some(p) = snap.partitions.iter().find(|p| p.fits(j)) {
            return Err(Violation::Starved { job: j.number(), partition: p.id() });
        }
    }

    // Recompute from scratch, by the book.
    let occupied = snap.partitions
        .iter()
        .filter(|p| !p.is_free())
        .collect::<Vec<_>>();
    let total: ByteSteps = occupied.iter().map(|p| p.internal_fragment()).sum();
    let avg = if occupied.is_empty() { 0.0 } else { total as f64 / occupied.len() as f64 };
    let util = occupied.iter()
        .filter_map(|p| p.job().map(|j| j.size() as f64 / p.size() as f64 * 100.0))
        .sum::<f64>() / snap.partitions.len() as f64;
    let m = &snap.metrics;
    if m.total_fragmentation != total
        || (m.avg_fragmentation - avg).abs() > 1e-9
        || (m.utilization - util).abs() > 1e-9 {
            return Err(Violation::MetricsDrift);
    }

    Ok(())
}

/// `n` partition sizes drawn uniformly from `1..=max`.
pub fn random_sizes<R: Rng>(rng: &mut R, n: usize, max: ByteSteps) -> Vec<ByteSteps> {
    (0..n).map(|_| rng.gen_range(1..=max)).collect()
}

/// A random mix of submissions, deallocations and status queries.
///
/// Job sizes go up to a fifth beyond `max_size`, so that some jobs can
/// never be placed. Deallocation targets are drawn among every number
/// handed out so far, which includes waiting and already freed jobs.
pub fn random_workload<R: Rng>(rng: &mut R, ops: usize, max_size: ByteSteps) -> Vec<Op> {
    let biggest = max_size + max_size / 5 + 1;
    let mut submitted: JobId = 0;
    let mut res = Vec::with_capacity(ops);
    for _ in 0..ops {
        let dice: f64 = rng.gen();
        if dice < 0.6 || submitted == 0 {
            submitted += 1;
            res.push(Op::Submit(rng.gen_range(1..=biggest)));
        } else if dice < 0.95 {
            res.push(Op::Deallocate(rng.gen_range(1..=submitted)));
        } else {
            res.push(Op::Status);
        }
    }

    res
}

/// What a single randomized run went through.
#[derive(Clone, Debug, Serialize)]
pub struct TrialReport {
    pub seed:                   u64,
    pub partitions:             Vec<ByteSteps>,
    pub ops:                    usize,
    pub allocated:              usize,
    pub queued:                 usize,
    pub deallocated:            usize,
    pub retried:                usize,
    pub not_found:              usize,
    pub peak_queue:             usize,
    pub mean_utilization:       f64,
    pub mean_avg_fragmentation: f64,
    pub violation:              Option<String>,
}

/// Knobs of a randomized run.
#[derive(Clone, Copy, Debug)]
pub struct TrialCfg {
    pub partitions:     usize,
    pub max_partition:  ByteSteps,
    pub ops:            usize,
}

/// Builds a simulator and a workload from `seed`, replays the workload
/// and checks every invariant after each step. Stops at the first
/// violation.
pub fn run_trial(seed: u64, cfg: TrialCfg) -> TrialReport {
    let mut rng = StdRng::seed_from_u64(seed);
    let sizes = random_sizes(&mut rng, cfg.partitions.max(1), cfg.max_partition.max(1));
    let workload = random_workload(&mut rng, cfg.ops, cfg.max_partition.max(1));

    let mut report = TrialReport {
        seed,
        partitions:             sizes.clone(),
        ops:                    0,
        allocated:              0,
        queued:                 0,
        deallocated:            0,
        retried:                0,
        not_found:              0,
        peak_queue:             0,
        mean_utilization:       0.0,
        mean_avg_fragmentation: 0.0,
        violation:              None,
    };
    // Sizes are drawn from 1..=max, so this cannot fail.
    let mut sim = match Simulator::new(&sizes) {
        Ok(s)   => s,
        Err(e)  => {
            report.violation = Some(e.to_string());
            return report;
        }
    };

    let (mut util_sum, mut frag_sum) = (0.0, 0.0);
    for op in workload {
        match sim.apply(op) {
            Outcome::Submitted { result: AllocationResult::Allocated { .. }, .. } => { report.allocated += 1; },
            Outcome::Submitted { result: AllocationResult::NoFit, .. } => { report.queued += 1; },
            Outcome::Deallocated { freed, .. }  => {
                report.deallocated += 1;
                report.retried += freed.placed.len();
            },
            Outcome::Rejected(_)    => { report.not_found += 1; },
            Outcome::Status(_)      => {},
        }
        report.ops += 1;

        let snap = sim.snapshot();
        report.peak_queue = report.peak_queue.max(snap.waiting_queue.len());
        util_sum += snap.metrics.utilization;
        frag_sum += snap.metrics.avg_fragmentation;
        if let Err(v) = check(&snap) {
            warn!(seed, step = report.ops, "{v}");
            report.violation = Some(v.to_string());
            break;
        }
    }
    if report.ops > 0 {
        report.mean_utilization = util_sum / report.ops as f64;
        report.mean_avg_fragmentation = frag_sum / report.ops as f64;
    }

    report
}
