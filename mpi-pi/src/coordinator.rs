//! Static partitioning of the sampling budget across ranks.
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do with the remainder when the budget does not divide evenly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionPolicy {
    /// Every rank gets `total / size`; the remainder is never sampled.
    #[default]
    Truncate,
    /// The first `total % size` ranks take one extra sample each.
    Spread,
}

impl FromStr for PartitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "truncate" => Ok(PartitionPolicy::Truncate),
            "spread" => Ok(PartitionPolicy::Spread),
            other => Err(format!(
                "unknown partition policy '{}', expected 'truncate' or 'spread'",
                other
            )),
        }
    }
}

impl fmt::Display for PartitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionPolicy::Truncate => write!(f, "truncate"),
            PartitionPolicy::Spread => write!(f, "spread"),
        }
    }
}

/// Per-process iteration count: `total_iterations / world_size`, truncated.
pub fn partition(total_iterations: u64, world_size: u32) -> Result<u64> {
    if world_size == 0 {
        return Err(Error::InvalidWorldSize(world_size));
    }
    Ok(total_iterations / u64::from(world_size))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Partition {
    total: u64,
    world_size: u32,
    policy: PartitionPolicy,
}

impl Partition {
    pub fn new(total: u64, world_size: u32, policy: PartitionPolicy) -> Result<Self> {
        // Validates the world size once so the accessors can't divide by zero.
        partition(total, world_size)?;
        Ok(Partition {
            total,
            world_size,
            policy,
        })
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn world_size(&self) -> u32 {
        self.world_size
    }

    pub fn policy(&self) -> PartitionPolicy {
        self.policy
    }

    /// Iterations every rank draws under truncation.
    pub fn per_process(&self) -> u64 {
        self.total / u64::from(self.world_size)
    }

    pub fn remainder(&self) -> u64 {
        self.total % u64::from(self.world_size)
    }

    /// Iterations drawn by `rank`.
    pub fn share(&self, rank: u32) -> u64 {
        debug_assert!(rank < self.world_size);
        match self.policy {
            PartitionPolicy::Truncate => self.per_process(),
            PartitionPolicy::Spread => {
                self.per_process() + u64::from(u64::from(rank) < self.remainder())
            }
        }
    }

    /// Iterations drawn by the whole group.
    pub fn executed(&self) -> u64 {
        match self.policy {
            PartitionPolicy::Truncate => self.per_process() * u64::from(self.world_size),
            PartitionPolicy::Spread => self.total,
        }
    }
}
