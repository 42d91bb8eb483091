//! Global sum of per-rank counts.
use crate::{check_rank, CommGroup, Result, RESERVED_TAG_BASE};
use tracing::trace;

const REDUCE_TAG: u32 = RESERVED_TAG_BASE + 1;

/// Sum `local` over every rank of the group onto `root`.
///
/// Returns `Some(total)` on the root and `None` everywhere else. This is a
/// collective: every rank must call it exactly once per round with the same
/// root, otherwise the root waits forever for the missing contribution.
pub async fn reduce_sum<C: CommGroup>(cg: &C, local: u64, root: u32) -> Result<Option<u64>> {
    let rank = cg.rank();
    let size = cg.size();
    check_rank(root, size)?;

    if rank != root {
        cg.send(&local, root, REDUCE_TAG).await?;
        return Ok(None);
    }

    // Contributions that arrive early are buffered by the backend, so
    // receiving in rank order doesn't depend on who sent first.
    let mut total = local;
    for source in (0..size).filter(|&r| r != root) {
        let part: u64 = cg.recv(source, REDUCE_TAG).await?;
        trace!(source, part, "received partial sum");
        total += part;
    }
    Ok(Some(total))
}
