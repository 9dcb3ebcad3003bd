//! Account table.

use crate::StoreError;
use lattice_types::{Account, Amount, BlockHash, Epoch, Timestamp};
use serde::{Deserialize, Serialize};

/// Per-account chain summary.
///
/// `head` always names a stored block owned by this account, and `block_count`
/// equals the number of blocks from `open_block` to `head` inclusive.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub head: BlockHash,
    /// The block that last set this account's representative.
    pub representative_block: BlockHash,
    pub open_block: BlockHash,
    pub balance: Amount,
    pub modified: Timestamp,
    pub block_count: u64,
    pub epoch: Epoch,
}

pub trait AccountStore {
    fn get_account(&self, account: &Account) -> Result<Option<AccountInfo>, StoreError>;

    fn account_exists(&self, account: &Account) -> Result<bool, StoreError> {
        Ok(self.get_account(account)?.is_some())
    }

    fn account_count(&self) -> Result<u64, StoreError>;

    /// All accounts in key order.
    fn accounts(&self) -> Result<Vec<(Account, AccountInfo)>, StoreError>;
}

pub trait AccountStoreMut {
    fn put_account(&mut self, account: &Account, info: &AccountInfo) -> Result<(), StoreError>;
    fn delete_account(&mut self, account: &Account) -> Result<(), StoreError>;
}
