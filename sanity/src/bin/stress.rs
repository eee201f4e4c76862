use clap::Parser;
use rayon::prelude::*;
use sanity::*;
use anyhow::{bail, Result};

/// Throws seeded random workloads at many independent best-fit
/// simulators in parallel, checking every invariant after every step
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of independent trials
    #[arg(short, long, default_value_t = 64)]
    trials:         u64,

    /// Operations per trial
    #[arg(short, long, default_value_t = 1000)]
    ops:            usize,

    /// Partitions per trial
    #[arg(short, long, default_value_t = 8)]
    partitions:     usize,

    /// Largest partition size
    #[arg(short, long, default_value_t = 128)]
    #[arg(value_parser = clap::value_parser!(ByteSteps))]
    max_partition:  ByteSteps,

    /// Seed of the first trial; trial i uses seed + i
    #[arg(short, long, default_value_t = 0)]
    seed:           u64,

    /// Dump every trial report as JSON
    #[arg(long, default_value_t = false)]
    json:           bool,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "warn", value_parser = logging::parse_level)]
    log_level:      Level,
}

fn main() -> Result<()> {
    let cli = Args::parse();
    logging::init(cli.log_level)?;
    let cfg = TrialCfg {
        partitions:     cli.partitions,
        max_partition:  cli.max_partition,
        ops:            cli.ops,
    };

    let reports: Vec<TrialReport> = (cli.seed..cli.seed + cli.trials)
        .into_par_iter()
        .map(|seed| run_trial(seed, cfg))
        .collect();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    let n = reports.len().max(1) as f64;
    let failed = reports.iter()
        .filter(|r| r.violation.is_some())
        .collect::<Vec<_>>();
    println!("Trials:\t\t\t{}", reports.len());
    println!("Ops per trial:\t\t{}", cli.ops);
    println!("Mean utilization:\t{:.2} %", reports.iter().map(|r| r.mean_utilization).sum::<f64>() / n);
    println!("Mean avg. int. frag.:\t{:.2}", reports.iter().map(|r| r.mean_avg_fragmentation).sum::<f64>() / n);
    println!("Peak queue length:\t{}", reports.iter().map(|r| r.peak_queue).max().unwrap_or(0));
    println!("Retry placements:\t{}", reports.iter().map(|r| r.retried).sum::<usize>());
    println!("Violations:\t\t{}", failed.len());
    for r in &failed {
        println!("  seed {}: {}", r.seed, r.violation.as_deref().unwrap_or_default());
    }

    if !failed.is_empty() {
        bail!("{} trial(s) violated invariants", failed.len());
    }

    Ok(())
}
