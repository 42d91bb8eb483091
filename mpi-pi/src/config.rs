use crate::{broadcast, check_rank, CommGroup, Error, PartitionPolicy, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ITERATIONS: u64 = 1_000_000_000;
pub const DEFAULT_PRECISION: usize = 8;

// Beyond 17 significant digits an f64 has nothing left to show.
const MAX_PRECISION: usize = 17;

/// Settings for one estimation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Total samples to draw across all ranks.
    pub iterations: u64,
    /// Rank that receives the global sum and prints the estimate.
    pub root: u32,
    /// Base seed; each rank seeds its generator with `seed + rank`.
    pub seed: u64,
    pub partition: PartitionPolicy,
    /// Significant digits in the printed estimate.
    pub precision: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            iterations: DEFAULT_ITERATIONS,
            root: 0,
            seed: 0,
            partition: PartitionPolicy::Truncate,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl Config {
    pub fn validate(&self, size: u32) -> Result<()> {
        check_rank(self.root, size)?;
        if !(1..=MAX_PRECISION).contains(&self.precision) {
            return Err(Error::InvalidPrecision(self.precision));
        }
        Ok(())
    }

    /// Replace this rank's settings with rank 0's, so the whole group runs
    /// with one configuration. Collective: every rank must call it.
    pub async fn synchronize<C: CommGroup>(self, cg: &C) -> Result<Config> {
        let local = (cg.rank() == 0).then_some(self);
        broadcast(cg, local, 0).await
    }
}
