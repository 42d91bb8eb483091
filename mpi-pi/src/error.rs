//! Error types for mpi-pi.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A communication group is already live in this process.
    #[error("attempted to initialize multiple MPI instances")]
    AlreadyInitialized,

    /// The process group could not be established.
    #[error("failed to initialize process group: {0}")]
    Init(String),

    /// Non-zero return code from an MPI call.
    #[error("MPI error (code {0})")]
    Mpi(i32),

    #[error("invalid world size: {0}")]
    InvalidWorldSize(u32),

    #[error("invalid rank {rank} for a group of size {size}")]
    InvalidRank { rank: u32, size: u32 },

    #[error("precision must be between 1 and 17 significant digits, got {0}")]
    InvalidPrecision(usize),

    #[error("failed to encode or decode message: {0}")]
    Codec(#[from] bincode::Error),

    /// The channel to a peer in a local group was closed.
    #[error("rank {0} disconnected")]
    Disconnected(u32),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check an MPI return code.
    pub fn check(code: i32) -> Result<()> {
        if code == 0 {
            Ok(())
        } else {
            Err(Error::Mpi(code))
        }
    }
}
