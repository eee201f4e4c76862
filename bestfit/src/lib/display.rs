use std::fmt::{self, Write};
use crate::utils::*;
use crate::io::Outcome;
use crate::{AllocationResult, Snapshot};

// Column widths of the status table, plus the gap between columns.
const COLS: [usize; 6] = [12, 12, 12, 12, 12, 18];
const GAP: usize = 2;
const HEADERS: [&str; 6] = ["Part. ID", "Size", "Status", "Job No.", "Job Size", "Int.Fragment"];

fn table_width() -> usize {
    COLS.iter().sum::<usize>() + (COLS.len() - 1) * GAP
}

fn push_line(out: &mut String, ch: char) {
    out.extend(std::iter::repeat(ch).take(table_width()));
    out.push('\n');
}

fn push_row(out: &mut String, cells: [String; 6]) {
    for (idx, (cell, width)) in cells.iter().zip(COLS).enumerate() {
        let _ = write!(out, "{cell:<width$}");
        if idx + 1 < COLS.len() {
            out.extend(std::iter::repeat(' ').take(GAP));
        }
    }
    out.push('\n');
}

/// Renders a [`Snapshot`] as the console status report: the partition
/// table, the waiting queue, the ledger and the metrics.
pub fn render_status(snap: &Snapshot) -> String {
    let mut out = String::from("\n");
    push_line(&mut out, '=');
    push_row(&mut out, HEADERS.map(String::from));
    push_line(&mut out, '-');

    for p in &snap.partitions {
        let row = match p.job() {
            None    => [
                p.id().to_string(),
                p.size().to_string(),
                "FREE".into(),
                "FREE".into(),
                "FREE".into(),
                "0".into(),
            ],
            Some(j) => [
                p.id().to_string(),
                p.size().to_string(),
                "USED".into(),
                j.number().to_string(),
                j.size().to_string(),
                p.internal_fragment().to_string(),
            ],
        };
        push_row(&mut out, row);
    }

    push_line(&mut out, '-');
    let indent = table_width() - COLS[5];
    let _ = writeln!(out, "{:indent$}Total: {}", "", snap.metrics.total_fragmentation);
    push_line(&mut out, '=');

    let queue = if snap.waiting_queue.is_empty() { "None".to_string() }
        else {
            snap.waiting_queue
                .iter()
                .map(|j| format!("[Job {} ({})]", j.number(), j.size()))
                .join(" ")
        };
    let ledger = if snap.deallocated_jobs.is_empty() { "None".to_string() }
        else {
            snap.deallocated_jobs
                .iter()
                .map(|j| format!("[Job {}]", j.number()))
                .join(" ")
        };
    let _ = writeln!(out, "\nWaiting Queue: {queue}");
    let _ = writeln!(out, "Deallocated Jobs: {ledger}");
    let _ = writeln!(out, "Average Internal Fragmentation: {:.2}", snap.metrics.avg_fragmentation);
    let _ = writeln!(out, "Memory Utilization: {:.2} %", snap.metrics.utilization);
    push_line(&mut out, '=');

    out
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Submitted { job, result } => {
                match result {
                    AllocationResult::Allocated { partition } => {
                        write!(f, "Job {} allocated to Partition {} (Best Fit).", job.number(), partition)
                    },
                    AllocationResult::NoFit => {
                        write!(f, "No available partition for Job {} → Added to waiting queue.", job.number())
                    },
                }
            },
            Outcome::Deallocated { job, freed } => {
                write!(f, "Job {} deallocated from Partition {}", job, freed.partition)?;
                for p in &freed.placed {
                    write!(f, "\nWaiting Job {} allocated to Partition {}.", p.job, p.partition)?;
                }
                Ok(())
            },
            Outcome::Rejected(SimError::JobNotFound(_)) => write!(f, "Job not found."),
            Outcome::Rejected(e)    => write!(f, "{e}"),
            Outcome::Status(snap)   => write!(f, "{}", render_status(snap)),
        }
    }
}
