//! Block table and successor index.
//!
//! Block bodies are immutable once stored. Each body is stored next to a
//! [`BlockSideband`] of denormalized metadata that is not part of the block hash.
//! The forward pointer from a block to the next block in its chain lives in a
//! separate successor index so the body record never changes after insertion.

use crate::StoreError;
use lattice_types::{Account, Amount, Block, BlockHash, Epoch, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDetails {
    /// Account epoch after this block.
    pub epoch: Epoch,
    pub is_send: bool,
    pub is_receive: bool,
    pub is_epoch: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSideband {
    pub account: Account,
    /// Position in the account chain; the open block has height 1.
    pub height: u64,
    /// Account balance after this block.
    pub balance: Amount,
    pub timestamp: Timestamp,
    pub details: BlockDetails,
    /// Epoch of the send this block received from; `Epoch0` when not a receive.
    pub source_epoch: Epoch,
}

impl BlockSideband {
    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredBlock {
    pub block: Block,
    pub sideband: BlockSideband,
}

impl StoredBlock {
    pub fn hash(&self) -> BlockHash {
        self.block.hash()
    }

    /// Type byte, block body, then the encoded sideband.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        let mut bytes = self.block.to_typed_bytes();
        bytes.extend_from_slice(&self.sideband.to_bytes()?);
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let (block, used) = Block::from_typed_bytes(bytes)?;
        let sideband = BlockSideband::from_bytes(&bytes[used..])?;
        Ok(Self { block, sideband })
    }
}

pub trait BlockStore {
    fn get_block(&self, hash: &BlockHash) -> Result<Option<StoredBlock>, StoreError>;

    fn block_exists(&self, hash: &BlockHash) -> Result<bool, StoreError> {
        Ok(self.get_block(hash)?.is_some())
    }

    fn block_count(&self) -> Result<u64, StoreError>;

    /// The block that follows `hash` in its account chain, if any.
    fn get_successor(&self, hash: &BlockHash) -> Result<Option<BlockHash>, StoreError>;
}

pub trait BlockStoreMut {
    fn put_block(&mut self, block: &Block, sideband: &BlockSideband) -> Result<(), StoreError>;
    fn delete_block(&mut self, hash: &BlockHash) -> Result<(), StoreError>;
    fn put_successor(&mut self, hash: &BlockHash, successor: &BlockHash)
        -> Result<(), StoreError>;
    fn delete_successor(&mut self, hash: &BlockHash) -> Result<(), StoreError>;
}
