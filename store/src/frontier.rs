//! Frontier table: head hash → account, maintained for legacy block types only.
//!
//! Legacy send, receive and change blocks do not name their account. While an
//! account's head is a legacy block, this table resolves the head back to the account.

use crate::StoreError;
use lattice_types::{Account, BlockHash};

pub trait FrontierStore {
    fn get_frontier(&self, head: &BlockHash) -> Result<Option<Account>, StoreError>;
    fn frontier_count(&self) -> Result<u64, StoreError>;
}

pub trait FrontierStoreMut {
    fn put_frontier(&mut self, head: &BlockHash, account: &Account) -> Result<(), StoreError>;
    fn delete_frontier(&mut self, head: &BlockHash) -> Result<(), StoreError>;
}
