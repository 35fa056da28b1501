use std::sync::Arc;

use parking_lot::RwLock;

/// Placeholder stored in fields whose collection failed.
pub const COLLECTION_ERROR: &str = "Error collecting data";

/// Optional metadata of the latest block. Each field may be missing on its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockMetadata {
    pub epoch: Option<f64>,
    pub signers: Option<String>,
    pub shard: Option<f64>,
}

/// Latest known state of the node.
///
/// Written by an external poller. Any field may still hold its zero value;
/// renderers treat that as "no data".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub app_version: String,
    pub shard_id: f64,
    pub peer_count: u64,
    pub leader: String,
    pub epoch: f64,

    // Consensus phases
    pub announce: String,
    pub on_announce: String,
    pub on_prepared: String,
    pub on_committed: String,

    pub block_reward: String,
    pub block_number: f64,
    pub block_size: i64,
    pub transaction_count: usize,
    pub block_hash: String,
    pub state_root: String,
    pub block_data: Option<BlockMetadata>,

    pub balance: String,
    /// Timestamp of the last consensus round the node took part in
    pub bingo: String,
    pub earning_rate: f64,
}

/// Shared handle to the snapshot, cloned into every widget task.
#[derive(Debug, Clone, Default)]
pub struct SharedSnapshot {
    inner: Arc<RwLock<Snapshot>>,
}

impl SharedSnapshot {
    /// Consistent copy of the current state.
    pub fn load(&self) -> Snapshot {
        self.inner.read().clone()
    }

    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Snapshot),
    {
        f(&mut self.inner.write());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_is_visible_to_clones() {
        let shared = SharedSnapshot::default();
        let reader = shared.clone();

        shared.update(|s| {
            s.peer_count = 12;
            s.leader = "one1leader".into();
        });

        let seen = reader.load();
        assert_eq!(seen.peer_count, 12);
        assert_eq!(seen.leader, "one1leader");
        assert!(seen.block_data.is_none());
    }

    #[test]
    fn test_load_is_a_detached_copy() {
        let shared = SharedSnapshot::default();
        shared.update(|s| s.epoch = 3.0);

        let before = shared.load();
        shared.update(|s| s.epoch = 4.0);

        assert_eq!(before.epoch, 3.0);
        assert_eq!(shared.load().epoch, 4.0);
    }
}
