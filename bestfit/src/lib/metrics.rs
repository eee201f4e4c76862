use crate::utils::*;
use crate::{Job, Partition, PartitionTable, Simulator};

/// Fragmentation and utilization figures of a [`PartitionTable`].
/// Always derived from the table's current state, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Metrics {
    /// Sum of internal fragments over occupied partitions.
    pub total_fragmentation:    ByteSteps,
    /// Total fragmentation divided by the number of occupied
    /// partitions; zero when none is occupied.
    pub avg_fragmentation:      f64,
    /// Mean, over *all* partitions, of the percentage of each
    /// partition filled by its job.
    pub utilization:            f64,
}

impl Metrics {
    pub fn of(table: &PartitionTable) -> Self {
        let mut total_fragmentation = 0;
        let mut used = 0;
        let mut fill_sum = 0.0;
        for p in table {
            if let Some(j) = p.job() {
                total_fragmentation += p.internal_fragment();
                used += 1;
                fill_sum += j.size as f64 / p.size() as f64 * 100.0;
            }
        }

        let avg_fragmentation = if used == 0 { 0.0 }
            else { total_fragmentation as f64 / used as f64 };

        // Free partitions count towards the denominator, dragging
        // utilization down. A table is never empty.
        let utilization = fill_sum / table.len() as f64;

        Self {
            total_fragmentation,
            avg_fragmentation,
            utilization,
        }
    }
}

/// A read-only picture of the whole simulation, for display or export.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub partitions:         Vec<Partition>,
    pub waiting_queue:      Vec<Job>,
    pub deallocated_jobs:   Vec<Job>,
    #[serde(flatten)]
    pub metrics:            Metrics,
}

impl Simulator {
    pub fn metrics(&self) -> Metrics {
        Metrics::of(&self.table)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            partitions:         self.table.iter().cloned().collect(),
            waiting_queue:      self.waiting.iter().copied().collect(),
            deallocated_jobs:   self.ledger.clone(),
            metrics:            self.metrics(),
        }
    }
}
