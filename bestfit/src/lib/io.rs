pub use anyhow::{Context, Error, Result};
use std::fs::File;
use crate::utils::*;
use crate::{AllocationResult, Deallocation, Job, Simulator, Snapshot};

/// A single step of a workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// Submit a new job of the given size.
    Submit(ByteSteps),
    /// Deallocate the job with the given number.
    Deallocate(JobId),
    /// Take a snapshot.
    Status,
}

/// What applying an [`Op`] produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Submitted {
        job:    Job,
        result: AllocationResult,
    },
    Deallocated {
        job:    JobId,
        freed:  Deallocation,
    },
    Rejected(SimError),
    Status(Box<Snapshot>),
}

impl Simulator {
    /// Runs one workload step. Submissions go through
    /// [`admit`](Simulator::admit), so jobs that fit nowhere are queued.
    pub fn apply(&mut self, op: Op) -> Outcome {
        match op {
            Op::Submit(size)    => {
                let submitted = self.submit_job(size)
                    .and_then(|job| Ok((job, self.admit(job)?)));
                match submitted {
                    Ok((job, result))   => Outcome::Submitted { job, result },
                    Err(e)              => Outcome::Rejected(e),
                }
            },
            Op::Deallocate(job) => {
                match self.deallocate(job) {
                    Ok(freed)   => Outcome::Deallocated { job, freed },
                    Err(e)      => Outcome::Rejected(e),
                }
            },
            Op::Status          => Outcome::Status(Box::new(self.snapshot())),
        }
    }
}

/// Parses a user-typed size. Anything that is not a positive
/// integer yields `None`.
pub fn parse_size(s: &str) -> Option<ByteSteps> {
    match s.trim().parse::<i64>() {
        Ok(v) if v > 0  => ByteSteps::try_from(v).ok(),
        _               => None,
    }
}

/// Parses a comma- and/or whitespace-separated list of partition sizes,
/// e.g. `100,50,30`. Zero sizes are let through so that the
/// [`PartitionTable`](crate::PartitionTable) gatekeeper can reject them.
pub fn parse_sizes(s: &str) -> Result<Vec<ByteSteps>> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|tok| !tok.is_empty())
        .map(|tok| {
            tok.parse::<ByteSteps>()
                .with_context(|| format!("Bad partition size: {tok:?}"))
        })
        .collect()
}

/// Reads partition sizes from a file: integers separated by commas
/// or newlines. Lines starting with `#` are ignored.
pub fn read_partition_sizes(path: &Path) -> Result<Vec<ByteSteps>> {
    let fd = File::open(path)
        .with_context(|| format!("Cannot open {}", path.display()))?;
    let mut res = vec![];
    for (n, line) in BufReader::new(fd).lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        res.append(
            &mut parse_sizes(line)
                .with_context(|| format!("{}:{}", path.display(), n + 1))?
        );
    }

    Ok(res)
}

/// Defines the interface for reading workloads.
///
/// [`CsvWorkload`] reads the plain text format below; other sources
/// only need to produce a sequence of [`Op`]s.
pub trait WorkloadGen {
    fn read_ops(&self) -> Result<Vec<Op>>;
}

/// One operation per line:
///
/// ```text
/// # comment
/// alloc,40
/// free,1
/// status
/// ```
pub struct CsvWorkload {
    pub path: PathBuf,
}

impl CsvWorkload {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
        }
    }
}

impl WorkloadGen for CsvWorkload {
    fn read_ops(&self) -> Result<Vec<Op>> {
        let fd = File::open(&self.path)
            .with_context(|| format!("Cannot open {}", self.path.display()))?;
        let mut res = vec![];
        for (n, line) in BufReader::new(fd).lines().enumerate() {
            let line = line?;
            if let Some(op) = parse_op(&line)
                .with_context(|| format!("{}:{}", self.path.display(), n + 1))? {
                    res.push(op);
            }
        }

        Ok(res)
    }
}

/// Parses a single workload line. Blank lines and comments yield `None`.
pub fn parse_op(line: &str) -> Result<Option<Op>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let fields = line.split(',')
        .map(str::trim)
        .collect_vec();
    let op = match fields.as_slice() {
        ["alloc", size] => Op::Submit(size.parse().context("Bad job size")?),
        ["free", job]   => Op::Deallocate(job.parse().context("Bad job number")?),
        ["status"]      => Op::Status,
        _               => { return Err(Error::msg(format!("Unknown operation: {line:?}"))); }
    };

    Ok(Some(op))
}
