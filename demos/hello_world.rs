use clap::Parser;
use mpi_pi::{local, Greeting, Result};
use std::process::ExitCode;
use tracing::error;

mod logging;

#[derive(Parser, Debug)]
#[command(author, version, about = "Print the rank, size and host of every process")]
struct Args {
    /// Run N ranks as threads in this process instead of joining an MPI world.
    #[arg(long, value_name = "N")]
    local_ranks: Option<u32>,
}

#[cfg(feature = "mpi")]
fn greet_mpi() -> Result<()> {
    let cg = mpi_pi::init_standard_mpi()?;
    println!("{}", Greeting::of(&cg));
    Ok(())
}

#[cfg(not(feature = "mpi"))]
fn greet_mpi() -> Result<()> {
    greet_local(1)
}

fn greet_local(size: u32) -> Result<()> {
    for line in local::run(size, |cg| Greeting::of(&cg).to_string())? {
        println!("{}", line);
    }
    Ok(())
}

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();
    let result = match args.local_ranks {
        Some(size) => greet_local(size),
        None => greet_mpi(),
    };
    if let Err(e) = result {
        error!(error = %e, "hello_world failed");
        eprintln!("hello_world: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
