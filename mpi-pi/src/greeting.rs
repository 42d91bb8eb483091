use crate::CommGroup;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who a rank is and where it runs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greeting {
    pub rank: u32,
    pub size: u32,
    pub processor_name: String,
}

impl Greeting {
    pub fn of<C: CommGroup>(cg: &C) -> Self {
        Greeting {
            rank: cg.rank(),
            size: cg.size(),
            processor_name: cg.processor_name(),
        }
    }
}

impl fmt::Display for Greeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Hello world from processor {}, rank {} out of {} processors",
            self.processor_name, self.rank, self.size
        )
    }
}
