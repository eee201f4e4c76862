use bestfit::*;
use bestfit::io::{CsvWorkload, Op, Outcome, WorkloadGen};

fn sim(sizes: &[ByteSteps]) -> Simulator {
    Simulator::new(sizes).unwrap()
}

/// Submits and admits a job, returning its number and the outcome.
fn push(s: &mut Simulator, size: ByteSteps) -> (JobId, AllocationResult) {
    let job = s.submit_job(size).unwrap();
    (job.number(), s.admit(job).unwrap())
}

fn holds(s: &Simulator, id: PartitionId) -> Option<JobId> {
    s.table().get(id).and_then(|p| p.job()).map(|j| j.number())
}

fn queued(s: &Simulator) -> Vec<JobId> {
    s.waiting().map(|j| j.number()).collect()
}

#[test]
fn ids_follow_creation_order() {
    let s = sim(&[30, 10, 20]);
    let got: Vec<(PartitionId, ByteSteps)> = s.table()
        .iter()
        .map(|p| (p.id(), p.size()))
        .collect();
    assert_eq!(got, vec![(1, 30), (2, 10), (3, 20)]);
    assert!(s.table().iter().all(|p| p.is_free()));
}

#[test]
fn zero_sized_partition_is_rejected() {
    assert_eq!(
        Simulator::new(&[10, 0, 5]).unwrap_err(),
        SimError::InvalidPartitionSize { index: 1, size: 0 }
    );
    assert_eq!(Simulator::new(&[]).unwrap_err(), SimError::NoPartitions);
}

#[test]
fn job_numbers_are_monotonic() {
    let mut s = sim(&[10]);
    assert_eq!(s.submit_job(3).unwrap().number(), 1);
    assert_eq!(s.submit_job(0), Err(SimError::InvalidJobSize(0)));
    // The rejected submission did not burn a number.
    assert_eq!(s.submit_job(4).unwrap().number(), 2);
    assert_eq!(s.submit_job(4).unwrap().number(), 3);
}

#[test]
fn best_fit_picks_smallest_leftover() {
    let mut s = sim(&[10, 7, 20]);
    let (j, res) = push(&mut s, 7);
    assert_eq!(res, AllocationResult::Allocated { partition: 2 });
    assert_eq!(holds(&s, 2), Some(j));
    assert_eq!(s.table().get(2).unwrap().internal_fragment(), 0);
}

#[test]
fn ties_go_to_lowest_id() {
    let mut s = sim(&[10, 10]);
    let (_, res) = push(&mut s, 8);
    assert_eq!(res, AllocationResult::Allocated { partition: 1 });
    let (_, res) = push(&mut s, 8);
    assert_eq!(res, AllocationResult::Allocated { partition: 2 });
}

#[test]
fn allocate_alone_never_queues() {
    let mut s = sim(&[5]);
    let big = s.submit_job(6).unwrap();
    assert_eq!(s.allocate(big), Ok(AllocationResult::NoFit));
    assert_eq!(s.waiting().count(), 0);
    assert!(s.table().get(1).unwrap().is_free());
}

#[test]
fn unplaced_job_can_still_be_admitted() {
    let mut s = sim(&[5]);
    let big = s.submit_job(6).unwrap();
    assert_eq!(s.allocate(big), Ok(AllocationResult::NoFit));
    assert_eq!(s.admit(big), Ok(AllocationResult::NoFit));
    assert_eq!(queued(&s), vec![big.number()]);
}

#[test]
fn placed_job_cannot_be_allocated_again() {
    let mut s = sim(&[10, 10]);
    let j = s.submit_job(4).unwrap();
    assert_eq!(s.allocate(j), Ok(AllocationResult::Allocated { partition: 1 }));
    let before = s.snapshot();
    assert_eq!(s.allocate(j), Err(SimError::StaleJob(j.number())));
    assert_eq!(s.admit(j), Err(SimError::StaleJob(j.number())));
    assert_eq!(s.snapshot(), before);
    assert_eq!(holds(&s, 2), None);
}

#[test]
fn queued_job_cannot_be_admitted_again() {
    let mut s = sim(&[5]);
    push(&mut s, 5);
    let j = s.submit_job(5).unwrap();
    assert_eq!(s.admit(j), Ok(AllocationResult::NoFit));
    assert_eq!(s.admit(j), Err(SimError::StaleJob(j.number())));
    assert_eq!(s.allocate(j), Err(SimError::StaleJob(j.number())));
    assert_eq!(queued(&s), vec![j.number()]);
}

#[test]
fn deallocated_job_cannot_come_back() {
    let mut s = sim(&[10]);
    let j = s.submit_job(4).unwrap();
    s.admit(j).unwrap();
    s.deallocate(j.number()).unwrap();
    assert_eq!(s.admit(j), Err(SimError::StaleJob(j.number())));
    assert!(s.table().get(1).unwrap().is_free());
    assert_eq!(s.ledger().len(), 1);
}

#[test]
fn jobs_from_another_simulator_are_refused() {
    let mut other = sim(&[10]);
    other.submit_job(1).unwrap();
    let foreign = other.submit_job(2).unwrap();
    let mut s = sim(&[10]);
    assert_eq!(s.admit(foreign), Err(SimError::StaleJob(foreign.number())));
    // Same number as a fresh local job, different size.
    s.submit_job(3).unwrap();
    let local = s.submit_job(7).unwrap();
    assert_eq!(local.number(), foreign.number());
    assert_eq!(s.admit(foreign), Err(SimError::StaleJob(foreign.number())));
    assert!(s.table().get(1).unwrap().is_free());
    assert_eq!(s.admit(local), Ok(AllocationResult::Allocated { partition: 1 }));
}

#[test]
fn waiting_queue_is_fifo() {
    let mut s = sim(&[5]);
    let (a, _) = push(&mut s, 5);
    let (b, res) = push(&mut s, 5);
    assert_eq!(res, AllocationResult::NoFit);
    assert_eq!(queued(&s), vec![b]);

    let freed = s.deallocate(a).unwrap();
    assert_eq!(freed.partition, 1);
    assert_eq!(freed.placed, vec![Placement { job: b, partition: 1 }]);
    assert_eq!(holds(&s, 1), Some(b));
    assert!(queued(&s).is_empty());
}

#[test]
fn retry_is_a_single_ordered_sweep() {
    // Partitions: 10 and 4. Fill both, then queue 9, 3, 8.
    let mut s = sim(&[10, 4]);
    let (big, _) = push(&mut s, 10);
    push(&mut s, 4);
    let (nine, _) = push(&mut s, 9);
    let (three, _) = push(&mut s, 3);
    let (eight, _) = push(&mut s, 8);
    assert_eq!(queued(&s), vec![nine, three, eight]);

    // Freeing the 10 lets the 9 in first; the 3 and the 8 still wait,
    // in their original order.
    let freed = s.deallocate(big).unwrap();
    assert_eq!(freed.placed, vec![Placement { job: nine, partition: 1 }]);
    assert_eq!(queued(&s), vec![three, eight]);
}

#[test]
fn retry_leaves_unfit_jobs_waiting() {
    let mut s = sim(&[20, 6, 6]);
    let (big, _) = push(&mut s, 20);
    push(&mut s, 6);
    push(&mut s, 6);
    let (a, _) = push(&mut s, 12);
    let (b, _) = push(&mut s, 7);
    let (c, _) = push(&mut s, 30);

    // The freed 20 goes to the 12. The 7 comes next and finds nothing.
    let freed = s.deallocate(big).unwrap();
    assert_eq!(freed.placed, vec![Placement { job: a, partition: 1 }]);
    assert_eq!(queued(&s), vec![b, c]);

    // Freeing the 12 lets the 7 in, while the 30 keeps waiting.
    let freed = s.deallocate(a).unwrap();
    assert_eq!(freed.placed, vec![Placement { job: b, partition: 1 }]);
    assert_eq!(queued(&s), vec![c]);
}

#[test]
fn unknown_job_changes_nothing() {
    let mut s = sim(&[10, 5]);
    push(&mut s, 10);
    push(&mut s, 50);
    let before = s.snapshot();
    assert_eq!(s.deallocate(42), Err(SimError::JobNotFound(42)));
    assert_eq!(s.snapshot(), before);
}

#[test]
fn waiting_jobs_cannot_be_deallocated() {
    let mut s = sim(&[10]);
    push(&mut s, 10);
    let (waiting, _) = push(&mut s, 20);
    assert_eq!(s.deallocate(waiting), Err(SimError::JobNotFound(waiting)));
    assert_eq!(queued(&s), vec![waiting]);
}

#[test]
fn ledger_keeps_deallocation_order() {
    let mut s = sim(&[10, 10, 10]);
    let (a, _) = push(&mut s, 3);
    let (b, _) = push(&mut s, 4);
    let (c, _) = push(&mut s, 5);
    s.deallocate(b).unwrap();
    s.deallocate(c).unwrap();
    s.deallocate(a).unwrap();
    let numbers: Vec<JobId> = s.ledger().iter().map(|j| j.number()).collect();
    assert_eq!(numbers, vec![b, c, a]);
    let first = s.ledger()[0];
    assert_eq!((first.number(), first.size()), (b, 4));
}

#[test]
fn metrics_of_a_free_table() {
    let m = sim(&[10, 20]).metrics();
    assert_eq!(m.total_fragmentation, 0);
    assert_eq!(m.avg_fragmentation, 0.0);
    assert_eq!(m.utilization, 0.0);
}

#[test]
fn fragmentation_counts_only_occupied_partitions() {
    let mut s = sim(&[100, 50, 30]);
    push(&mut s, 40);
    push(&mut s, 25);
    // 50 - 40 and 30 - 25; the free 100 adds nothing.
    let m = s.metrics();
    assert_eq!(m.total_fragmentation, 15);
    assert_eq!(m.avg_fragmentation, 7.5);
}

#[test]
fn utilization_averages_over_free_partitions_too() {
    // Deliberate: a free partition contributes 0% and still counts
    // in the denominator.
    let mut s = sim(&[100, 100]);
    push(&mut s, 50);
    let m = s.metrics();
    assert!((m.utilization - 25.0).abs() < 1e-9);
}

#[test]
fn snapshots_are_idempotent() {
    let mut s = sim(&[100, 50, 30]);
    push(&mut s, 40);
    push(&mut s, 29);
    push(&mut s, 200);
    let first = s.snapshot();
    let second = s.snapshot();
    assert_eq!(first, second);
    assert_eq!(first.metrics, second.metrics);
}

#[test]
fn end_to_end() {
    let mut s = sim(&[100, 50, 30]);

    let (job1, res) = push(&mut s, 40);
    assert_eq!(res, AllocationResult::Allocated { partition: 2 });
    assert_eq!(s.table().get(2).unwrap().internal_fragment(), 10);

    let (job2, res) = push(&mut s, 40);
    assert_eq!(res, AllocationResult::Allocated { partition: 1 });
    assert_eq!(s.table().get(1).unwrap().internal_fragment(), 60);

    let freed = s.deallocate(job1).unwrap();
    assert_eq!(freed.partition, 2);
    assert!(freed.placed.is_empty());
    assert!(s.table().get(2).unwrap().is_free());
    let ledger = s.ledger().iter().map(|j| (j.number(), j.size())).collect::<Vec<_>>();
    assert_eq!(ledger, vec![(job1, 40)]);
    assert_eq!(holds(&s, 1), Some(job2));
    assert!(queued(&s).is_empty());
}

#[test]
fn snapshot_serializes() {
    let mut s = sim(&[10, 5]);
    push(&mut s, 4);
    push(&mut s, 11);
    let v = serde_json::to_value(s.snapshot()).unwrap();
    assert_eq!(v["partitions"][0]["occupancy"]["status"], "free");
    assert_eq!(v["partitions"][1]["occupancy"]["status"], "occupied");
    assert_eq!(v["partitions"][1]["occupancy"]["job"], 1);
    assert_eq!(v["waiting_queue"][0]["number"], 2);
    assert_eq!(v["total_fragmentation"], 1);
}

#[test]
fn replays_a_workload_file() {
    let mut path = std::env::temp_dir();
    path.push(format!("bestfit-workload-{}.csv", std::process::id()));
    std::fs::write(&path, "# warmup\nalloc,40\nalloc,40\n\nfree,1\nfree,7\nstatus\n").unwrap();

    let ops = CsvWorkload::new(path.clone()).read_ops().unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(ops, vec![
        Op::Submit(40),
        Op::Submit(40),
        Op::Deallocate(1),
        Op::Deallocate(7),
        Op::Status,
    ]);

    let mut s = sim(&[100, 50, 30]);
    let outcomes: Vec<Outcome> = ops.into_iter().map(|op| s.apply(op)).collect();
    assert!(matches!(
        outcomes[1],
        Outcome::Submitted { result: AllocationResult::Allocated { partition: 1 }, .. }
    ));
    assert!(matches!(outcomes[3], Outcome::Rejected(SimError::JobNotFound(7))));
    match &outcomes[4] {
        Outcome::Status(snap)   => assert_eq!(snap.deallocated_jobs.len(), 1),
        other                   => panic!("Expected a status, got {other:?}"),
    }
}

#[test]
fn reads_partition_size_files() {
    let mut path = std::env::temp_dir();
    path.push(format!("bestfit-sizes-{}.txt", std::process::id()));
    std::fs::write(&path, "# pool\n100,50\n30\n").unwrap();
    let sizes = bestfit::io::read_partition_sizes(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(sizes, vec![100, 50, 30]);
}
