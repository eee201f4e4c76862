use std::io;
use clap::Parser;
use bestfit::*;
use bestfit::io::{parse_sizes, read_partition_sizes, Op, Result};
use bestfit::console::Console;
use bestfit::display::render_status;

/// An interactive fixed-partition memory simulator using best fit
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Comma-separated partition sizes, e.g. 100,50,30
    #[arg(short, long, conflicts_with = "sizes")]
    partitions: Option<String>,

    /// Path to a file holding partition sizes
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    sizes:      Option<PathBuf>,

    /// Print status as JSON instead of a table
    #[arg(long, default_value_t = false)]
    json:       bool,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "warn", value_parser = logging::parse_level)]
    log_level:  Level,
}

fn show_status(sim: &Simulator, json: bool) -> Result<()> {
    let snap = sim.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&snap)?);
    } else {
        print!("{}", render_status(&snap));
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Args::parse();
    logging::init(cli.log_level)?;
    let mut console = Console::new(io::stdin().lock(), io::stdout());

    let sizes = if let Some(list) = cli.partitions {
        parse_sizes(&list)?
    } else if let Some(path) = cli.sizes {
        read_partition_sizes(&path)?
    } else {
        match console.ask_partitions()? {
            Some(s) => s,
            None    => return Ok(()),
        }
    };
    let mut sim = Simulator::new(&sizes)?;

    loop {
        println!("\n========== BEST FIT MENU ==========");
        println!("1. Add Job");
        println!("2. Deallocate Job");
        println!("3. Show Status");
        println!("4. Exit");
        let Some(choice) = console.ask("Choose: ")? else { break };
        match choice.as_str() {
            "1" => {
                let Some(size) = console.ask_size("Enter job size: ")? else { break };
                println!("\n{}", sim.apply(Op::Submit(size)));
            },
            "2" => {
                let Some(ans) = console.ask("Enter job number to deallocate: ")? else { break };
                match ans.parse::<JobId>() {
                    Ok(job) => println!("\n{}", sim.apply(Op::Deallocate(job))),
                    Err(_)  => println!("\nJob not found."),
                }
            },
            "3" => show_status(&sim, cli.json)?,
            "4" => break,
            _   => {},
        }
    }

    Ok(())
}
