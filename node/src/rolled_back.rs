//! Recently rolled back block hashes.
//!
//! A block that just lost a forced replacement is often resubmitted by the
//! network moments later. Remembering the last few undone hashes lets
//! [`crate::BlockProcessor::add`] ignore those echoes. Bounded FIFO: when
//! full, the oldest entry is evicted.

use lattice_types::BlockHash;
use std::collections::{HashSet, VecDeque};

pub struct RolledBack {
    set: HashSet<BlockHash>,
    order: VecDeque<BlockHash>,
    capacity: usize,
}

impl RolledBack {
    pub fn new(capacity: usize) -> Self {
        Self {
            set: HashSet::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert a hash, evicting the oldest entry if at capacity.
    pub fn insert(&mut self, hash: BlockHash) {
        if self.capacity == 0 || self.set.contains(&hash) {
            return;
        }
        if self.order.len() >= self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.set.remove(&evicted);
            }
        }
        self.set.insert(hash);
        self.order.push_back(hash);
    }

    pub fn contains(&self, hash: &BlockHash) -> bool {
        self.set.contains(hash)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}
