use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::pin::Pin;

pub trait DataType: Serialize + DeserializeOwned + Default + Clone + 'static {}

impl<T> DataType for T where T: Serialize + DeserializeOwned + Default + Clone + 'static {}

/// Tags at or above this value are reserved for the collectives in this
/// crate. Point-to-point users should stay below it.
pub const RESERVED_TAG_BASE: u32 = 32000;

/// A fixed group of cooperating processes.
///
/// Messages between one source and one destination with the same tag are
/// received in the order they were sent.
pub trait CommGroup {
    /// Get the rank of the process in the group.
    fn rank(&self) -> u32;
    /// Get the size of this communication group.
    fn size(&self) -> u32;
    /// Name of the processor (host) this rank runs on.
    fn processor_name(&self) -> String;
    /// Send data to a destination process.
    fn send<T: DataType>(
        &self,
        data: &T,
        dest: u32,
        tag: u32,
    ) -> Pin<Box<dyn Future<Output = Result<()>>>>;
    /// Receive some data from a source process.
    fn recv<T: DataType>(&self, source: u32, tag: u32) -> Pin<Box<dyn Future<Output = Result<T>>>>;
}

pub(crate) fn check_rank(rank: u32, size: u32) -> Result<()> {
    if rank < size {
        Ok(())
    } else {
        Err(Error::InvalidRank { rank, size })
    }
}

mod broadcast;
mod config;
mod coordinator;
mod error;
mod greeting;
pub mod local;
mod monte_carlo;
#[cfg(feature = "mpi")]
mod mpi;
mod reducer;
mod reporter;
mod sampler;

pub use broadcast::broadcast;
pub use config::{Config, DEFAULT_ITERATIONS, DEFAULT_PRECISION};
pub use coordinator::{partition, Partition, PartitionPolicy};
pub use error::{Error, Result};
pub use greeting::Greeting;
pub use local::LocalCommGroup;
pub use monte_carlo::compute_pi;
#[cfg(feature = "mpi")]
pub use mpi::{init_standard_mpi, MPICommGroup};
pub use reducer::reduce_sum;
pub use reporter::{estimate_pi, format_significant, report, PiEstimate};
pub use sampler::{Sampler, WARMUP_DRAWS};
