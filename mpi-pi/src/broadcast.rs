//! Tree broadcast over point-to-point messages.
use crate::{check_rank, CommGroup, DataType, Result, RESERVED_TAG_BASE};

const BCAST_TAG: u32 = RESERVED_TAG_BASE;

/// Broadcast a value from `root` to every rank in the group.
///
/// The root passes `Some(value)`, every other rank `None`; all ranks get
/// the value back. Ranks are arranged in a binary tree relative to the root:
/// each rank receives from its parent and forwards to at most two children.
/// Every rank in the group must call this with the same root.
pub async fn broadcast<C, T>(cg: &C, value: Option<T>, root: u32) -> Result<T>
where
    C: CommGroup,
    T: DataType,
{
    let rank = cg.rank();
    let size = cg.size();
    check_rank(root, size)?;

    // Position in the tree rooted at `root`.
    let vrank = (rank + size - root) % size;
    let to_rank = |v: u32| (v + root) % size;

    let value = if vrank == 0 {
        // Only the root has anything to send.
        value.unwrap_or_default()
    } else {
        let parent = to_rank((vrank - 1) / 2);
        cg.recv(parent, BCAST_TAG).await?
    };

    for child in [2 * vrank + 1, 2 * vrank + 2] {
        if child < size {
            cg.send(&value, to_rank(child), BCAST_TAG).await?;
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local;
    use futures::executor;

    fn broadcast_from(size: u32, root: u32) -> Vec<Vec<i32>> {
        local::run(size, |cg| {
            let value = (cg.rank() == root).then(|| vec![1, 2, 3]);
            executor::block_on(broadcast(&cg, value, root)).unwrap()
        })
        .unwrap()
    }

    #[test]
    fn single_rank_keeps_its_value() {
        assert_eq!(broadcast_from(1, 0), vec![vec![1, 2, 3]]);
    }

    #[test]
    fn every_rank_receives_from_rank_zero() {
        let got = broadcast_from(7, 0);
        assert!(got.iter().all(|v| v == &vec![1, 2, 3]));
    }

    #[test]
    fn every_rank_receives_from_non_zero_root() {
        for root in 0..5 {
            let got = broadcast_from(5, root);
            assert_eq!(got.len(), 5);
            assert!(got.iter().all(|v| v == &vec![1, 2, 3]), "root {}", root);
        }
    }

    #[test]
    fn root_outside_group_is_rejected() {
        let world = crate::LocalCommGroup::world(2).unwrap();
        let err = executor::block_on(broadcast(&world[0], Some(1u8), 2)).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidRank { rank: 2, size: 2 }));
    }
}
