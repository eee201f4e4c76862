use crate::utils::*;
use crate::{Job, Partition};

/// The simulated memory pool: an ordered collection of [`Partition`]s,
/// set up once and never grown or shrunk afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PartitionTable {
    parts: Vec<Partition>,
}

impl PartitionTable {
    /// Builds the table, assigning ids 1..N in the given order.
    ///
    /// This function is the gatekeeper to the rest of the library: a
    /// successfully returned table contains at least one partition, and
    /// none of its partitions has zero size.
    pub fn new(sizes: &[ByteSteps]) -> Result<Self, SimError> {
        if sizes.is_empty() {
            return Err(SimError::NoPartitions);
        }
        let mut parts = Vec::with_capacity(sizes.len());
        for (index, &size) in sizes.iter().enumerate() {
            if size == 0 {
                return Err(SimError::InvalidPartitionSize { index, size });
            }
            parts.push(Partition::new(index as PartitionId + 1, size));
        }

        Ok(Self { parts })
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Partition> {
        self.parts.iter()
    }

    pub fn get(&self, id: PartitionId) -> Option<&Partition> {
        (id as usize)
            .checked_sub(1)
            .and_then(|idx| self.parts.get(idx))
    }

    /// The partition currently holding job number `job`, if any.
    pub fn holder_of(&self, job: JobId) -> Option<&Partition> {
        self.parts
            .iter()
            .find(|p| matches!(p.job(), Some(j) if j.number == job))
    }

    /// Searches for the free partition that fits `job` with the smallest
    /// leftover space. Ties are won by the lowest id.
    pub fn best_fit(&self, job: &Job) -> Option<PartitionId> {
        let mut smallest_leftover = ByteSteps::MAX;
        let mut best: Option<PartitionId> = None;
        for p in &self.parts {
            if p.fits(job) {
                let leftover = p.size() - job.size;
                // Strictly less: the first of equally good
                // candidates must win.
                if leftover < smallest_leftover {
                    smallest_leftover = leftover;
                    best = Some(p.id());
                }
            }
        }

        best
    }

    pub(crate) fn get_mut(&mut self, id: PartitionId) -> Option<&mut Partition> {
        (id as usize)
            .checked_sub(1)
            .and_then(move |idx| self.parts.get_mut(idx))
    }

    pub(crate) fn holder_of_mut(&mut self, job: JobId) -> Option<&mut Partition> {
        self.parts
            .iter_mut()
            .find(|p| matches!(p.job(), Some(j) if j.number == job))
    }
}

impl<'a> IntoIterator for &'a PartitionTable {
    type Item = &'a Partition;
    type IntoIter = std::slice::Iter<'a, Partition>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
}
