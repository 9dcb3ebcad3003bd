//! Interning of incoming blocks.
//!
//! The same block often arrives many times from different peers. Interning by
//! full hash (block hash, signature and work) means every copy in flight shares
//! one allocation. The map only holds weak handles; dead entries are swept out
//! every [`SWEEP_INTERVAL`] insertions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use lattice_crypto::blake2b_256_multi;
use lattice_types::Block;

const SWEEP_INTERVAL: usize = 256;

pub struct BlockUniquer {
    inner: Mutex<Inner>,
}

struct Inner {
    cache: HashMap<[u8; 32], Weak<Block>>,
    inserts: usize,
}

impl BlockUniquer {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                cache: HashMap::new(),
                inserts: 0,
            }),
        }
    }

    /// The shared handle for `block`'s content; `block` itself if none is alive.
    pub fn unique(&self, block: Arc<Block>) -> Arc<Block> {
        let key = full_hash(&block);
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = inner.cache.get(&key).and_then(Weak::upgrade) {
            return existing;
        }
        inner.cache.insert(key, Arc::downgrade(&block));
        inner.inserts += 1;
        if inner.inserts % SWEEP_INTERVAL == 0 {
            inner.cache.retain(|_, weak| weak.strong_count() > 0);
        }
        block
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cache
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for BlockUniquer {
    fn default() -> Self {
        Self::new()
    }
}

fn full_hash(block: &Block) -> [u8; 32] {
    let hash = block.hash();
    let work = block.work().to_le_bytes();
    blake2b_256_multi(&[hash.as_bytes(), block.signature().as_bytes(), &work])
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_crypto::{keypair_from_seed, send_block};
    use lattice_types::{Amount, BlockHash};

    fn block(work: u64) -> Block {
        let keys = keypair_from_seed(&[1; 32]);
        send_block(BlockHash::from(1), keys.account, Amount::raw(10), &keys, work)
    }

    #[test]
    fn equal_blocks_share_one_allocation() {
        let uniquer = BlockUniquer::new();
        let first = uniquer.unique(Arc::new(block(7)));
        let second = uniquer.unique(Arc::new(block(7)));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(uniquer.len(), 1);
    }

    #[test]
    fn different_work_is_a_different_entry() {
        let uniquer = BlockUniquer::new();
        let first = uniquer.unique(Arc::new(block(1)));
        let second = uniquer.unique(Arc::new(block(2)));
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.hash(), second.hash());
        assert_eq!(uniquer.len(), 2);
    }

    #[test]
    fn dropped_blocks_are_replaced_and_swept() {
        let uniquer = BlockUniquer::new();
        drop(uniquer.unique(Arc::new(block(1))));
        let fresh = Arc::new(block(1));
        let interned = uniquer.unique(Arc::clone(&fresh));
        assert!(Arc::ptr_eq(&fresh, &interned));

        // Two inserts so far; the last of these triggers the sweep while its
        // own block is still alive.
        for work in 0..(SWEEP_INTERVAL - 2) as u64 {
            drop(uniquer.unique(Arc::new(block(1_000 + work))));
        }
        assert_eq!(uniquer.len(), 2);
    }
}
