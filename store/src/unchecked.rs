//! Unchecked table: blocks parked until a missing dependency arrives.
//!
//! Keyed by `(dependency, block hash)` so that every block waiting on one
//! dependency is found with a single prefix scan.

use crate::StoreError;
use lattice_types::{Account, Block, BlockHash, SignatureVerification, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UncheckedKey {
    pub dependency: BlockHash,
    pub hash: BlockHash,
}

impl UncheckedKey {
    pub fn new(dependency: BlockHash, hash: BlockHash) -> Self {
        Self { dependency, hash }
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        let mut key = [0u8; 64];
        key[..32].copy_from_slice(self.dependency.as_bytes());
        key[32..].copy_from_slice(self.hash.as_bytes());
        key
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        Some(Self {
            dependency: BlockHash::from_slice(bytes.get(..32)?)?,
            hash: BlockHash::from_slice(bytes.get(32..64)?)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncheckedInfo {
    pub block: Block,
    /// Account the submitter claims the block belongs to; zero when unknown.
    pub account: Account,
    /// Arrival time; zero until the block is first parked.
    pub modified: Timestamp,
    pub verified: SignatureVerification,
}

impl UncheckedInfo {
    pub fn new(block: Block, modified: Timestamp) -> Self {
        Self {
            block,
            account: Account::ZERO,
            modified,
            verified: SignatureVerification::Unknown,
        }
    }
}

pub trait UncheckedStore {
    /// Every parked block waiting on `dependency`.
    fn get_unchecked(
        &self,
        dependency: &BlockHash,
    ) -> Result<Vec<(UncheckedKey, UncheckedInfo)>, StoreError>;

    fn unchecked_exists(&self, key: &UncheckedKey) -> Result<bool, StoreError>;

    fn unchecked_count(&self) -> Result<u64, StoreError>;
}

pub trait UncheckedStoreMut {
    fn put_unchecked(&mut self, key: &UncheckedKey, info: &UncheckedInfo)
        -> Result<(), StoreError>;
    fn delete_unchecked(&mut self, key: &UncheckedKey) -> Result<(), StoreError>;
}
