//! Benchmark runner: serial vs parallel for one algorithm over a list of sizes.

use clap::Parser;
use matmul_recursive::harness::{self, BenchConfig, BenchRecord, DEFAULT_SIZES};
use matmul_recursive::threaded::DEFAULT_TASK_CUTOFF;
use matmul_recursive::{Algorithm, InPlaceSchedule, ParallelConfig};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "matmul-recursive")]
#[command(author, version, about = "Recursive and Winograd matrix multiplication benchmark")]
struct Cli {
    /// Algorithm to benchmark: recursive, in-place or winograd
    #[arg(short, long, default_value = "in-place")]
    algorithm: Algorithm,

    /// Matrix sizes, comma separated
    #[arg(short, long, value_delimiter = ',')]
    sizes: Vec<usize>,

    /// Worker threads for the parallel variant (default: all cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Sub-problems this size or smaller run serially inside their task
    #[arg(long, default_value_t = DEFAULT_TASK_CUTOFF)]
    cutoff: usize,

    /// Parallel in-place schedule: paired (default) or atomic.
    /// Only used with --algorithm in-place
    #[arg(long)]
    schedule: Option<InPlaceSchedule>,

    /// Timed runs per variant
    #[arg(short, long, default_value_t = 1)]
    iterations: usize,

    /// Print the inputs and product for one size instead of benchmarking
    #[arg(long, value_name = "SIZE")]
    print: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Some(size) = cli.print {
        print!("{}", harness::demo(size, cli.algorithm)?);
        return Ok(true);
    }

    let config = BenchConfig {
        sizes: if cli.sizes.is_empty() {
            DEFAULT_SIZES.to_vec()
        } else {
            cli.sizes
        },
        algorithm: cli.algorithm,
        parallel: ParallelConfig {
            threads: cli.threads,
            task_cutoff: cli.cutoff,
            in_place_schedule: schedule_for(cli.algorithm, cli.schedule),
        },
        iterations: cli.iterations,
    };

    println!("=== {} multiplication: parallel vs serial ===\n", config.algorithm);
    println!("size\tparallel (s)\tserial (s)\tequal");
    println!("{}", "-".repeat(50));

    let records = harness::run(&config)?;
    for record in &records {
        println!("{}", record);
    }

    print_summary(&records);
    Ok(records.iter().all(|r| r.equal))
}

/// The in-place schedule to run with. Warns when one was requested for an
/// algorithm that has no use for it.
fn schedule_for(algorithm: Algorithm, requested: Option<InPlaceSchedule>) -> InPlaceSchedule {
    match requested {
        Some(schedule) if algorithm != Algorithm::RecursiveInPlace => {
            tracing::warn!(
                %schedule,
                %algorithm,
                "--schedule only applies to the in-place algorithm; ignoring it"
            );
            InPlaceSchedule::default()
        }
        Some(schedule) => schedule,
        None => InPlaceSchedule::default(),
    }
}

fn print_summary(records: &[BenchRecord]) {
    println!("\n{}", "=".repeat(50));
    println!("{:>8} {:>14} {:>10}", "Size", "Speedup", "Equal");
    println!("{}", "-".repeat(50));
    for record in records {
        println!(
            "{:>8} {:>13.2}× {:>10}",
            record.size,
            record.speedup(),
            if record.equal { "yes" } else { "NO" }
        );
    }
    println!("{}", "=".repeat(50));
    println!("\nSpeedup = serial time / parallel time. Higher is better.\n");
}
