//! Monte Carlo estimate of pi across a group of processes.
//!
//! Run with `mpiexec -n 4 compute_pi` when built with `--features mpi`, or
//! in-process with `compute_pi --local-ranks 4`.
use clap::Parser;
use futures::executor;
use mpi_pi::{
    compute_pi, local, report, CommGroup, Config, PartitionPolicy, Result, DEFAULT_ITERATIONS,
    DEFAULT_PRECISION,
};
use std::io;
use std::process::ExitCode;
use tracing::{debug, error};

mod logging;

#[derive(Parser, Debug)]
#[command(author, version, about = "Estimate pi by distributed Monte Carlo sampling")]
struct Args {
    /// Total number of samples across all ranks.
    #[arg(short = 'n', long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: u64,

    /// Rank that collects the counts and prints the estimate.
    #[arg(long, default_value_t = 0)]
    root: u32,

    /// Base seed; rank r uses seed + r.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// What to do with samples that don't divide evenly: truncate or spread.
    #[arg(long, default_value_t = PartitionPolicy::Truncate)]
    partition: PartitionPolicy,

    /// Significant digits in the printed estimate.
    #[arg(long, default_value_t = DEFAULT_PRECISION)]
    precision: usize,

    /// Run N ranks as threads in this process instead of joining an MPI world.
    #[arg(long, value_name = "N")]
    local_ranks: Option<u32>,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            iterations: self.iterations,
            root: self.root,
            seed: self.seed,
            partition: self.partition,
            precision: self.precision,
        }
    }
}

fn run_rank<C: CommGroup>(cg: &C, config: Config) -> Result<()> {
    let config = executor::block_on(config.synchronize(cg))?;
    if let Some(estimate) = executor::block_on(compute_pi(cg, &config))? {
        report(&mut io::stdout().lock(), &estimate, config.precision)?;
    }
    Ok(())
}

fn run_local(size: u32, config: Config) -> Result<()> {
    debug!(size, "running in-process group");
    local::run(size, |cg| run_rank(&cg, config.clone()))?
        .into_iter()
        .collect()
}

#[cfg(feature = "mpi")]
fn run_mpi(config: Config) -> Result<()> {
    let cg = mpi_pi::init_standard_mpi()?;
    run_rank(&cg, config)
}

#[cfg(not(feature = "mpi"))]
fn run_mpi(config: Config) -> Result<()> {
    debug!("built without MPI support, running a single local rank");
    run_local(1, config)
}

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();
    let config = args.config();
    let result = match args.local_ranks {
        Some(size) => run_local(size, config),
        None => run_mpi(config),
    };
    if let Err(e) = result {
        error!(error = %e, "compute_pi failed");
        eprintln!("compute_pi: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
