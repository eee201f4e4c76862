use clap::Parser;
use bestfit::*;
use bestfit::io::{parse_sizes, read_partition_sizes, CsvWorkload, Error, Outcome, Result, WorkloadGen};
use bestfit::display::render_status;

/// Replays a workload file against a best-fit partition table
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Comma-separated partition sizes, e.g. 100,50,30
    #[arg(short, long, conflicts_with = "sizes")]
    partitions: Option<String>,

    /// Path to a file holding partition sizes
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    sizes:      Option<PathBuf>,

    /// Path to the workload (alloc,<size> / free,<job> / status)
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    workload:   PathBuf,

    /// Print only the final snapshot, as JSON
    #[arg(long, default_value_t = false)]
    json:       bool,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "warn", value_parser = logging::parse_level)]
    log_level:  Level,
}

fn main() -> Result<()> {
    let cli = Args::parse();
    logging::init(cli.log_level)?;

    let sizes = match (cli.partitions, cli.sizes) {
        (Some(list), _)     => parse_sizes(&list)?,
        (None, Some(path))  => read_partition_sizes(&path)?,
        (None, None)        => {
            return Err(Error::msg("Either --partitions or --sizes is needed."));
        }
    };
    let ops = CsvWorkload::new(cli.workload).read_ops()?;
    let mut sim = Simulator::new(&sizes)?;
    info!(ops = ops.len(), "Replaying workload");

    for op in ops {
        let outcome = sim.apply(op);
        if cli.json { continue; }
        match outcome {
            Outcome::Status(_)  => print!("{outcome}"),
            _                   => println!("{outcome}"),
        }
    }

    let snap = sim.snapshot();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snap)?);
    } else {
        print!("{}", render_status(&snap));
    }

    Ok(())
}
