//! Pending (receivable) table.

use crate::StoreError;
use lattice_types::{Account, Amount, BlockHash, Epoch};
use serde::{Deserialize, Serialize};

/// `(destination account, send block hash)`. Orders by account first so that all
/// receivables of one account are contiguous.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PendingKey {
    pub account: Account,
    pub hash: BlockHash,
}

impl PendingKey {
    pub fn new(account: Account, hash: BlockHash) -> Self {
        Self { account, hash }
    }

    /// 64-byte binary key: account then hash.
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut key = [0u8; 64];
        key[..32].copy_from_slice(self.account.as_bytes());
        key[32..].copy_from_slice(self.hash.as_bytes());
        key
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        Some(Self {
            account: Account::from_slice(bytes.get(..32)?)?,
            hash: BlockHash::from_slice(bytes.get(32..64)?)?,
        })
    }
}

/// An uncollected send: `amount` sent by `source`, in the sender's `epoch`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInfo {
    pub source: Account,
    pub amount: Amount,
    pub epoch: Epoch,
}

pub trait PendingStore {
    fn get_pending(&self, key: &PendingKey) -> Result<Option<PendingInfo>, StoreError>;

    fn pending_exists(&self, key: &PendingKey) -> Result<bool, StoreError> {
        Ok(self.get_pending(key)?.is_some())
    }

    /// All receivables of `account`, ordered by send hash.
    fn pending_for_account(
        &self,
        account: &Account,
    ) -> Result<Vec<(PendingKey, PendingInfo)>, StoreError>;

    fn any_pending(&self, account: &Account) -> Result<bool, StoreError> {
        Ok(!self.pending_for_account(account)?.is_empty())
    }

    fn pending_count(&self) -> Result<u64, StoreError>;
}

pub trait PendingStoreMut {
    fn put_pending(&mut self, key: &PendingKey, info: &PendingInfo) -> Result<(), StoreError>;
    fn delete_pending(&mut self, key: &PendingKey) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_bytes_round_trip_and_order() {
        let a = PendingKey::new(Account::new([1; 32]), BlockHash::new([9; 32]));
        let b = PendingKey::new(Account::new([2; 32]), BlockHash::new([0; 32]));
        assert_eq!(PendingKey::from_bytes(&a.to_bytes()), Some(a));
        assert!(a < b);
        assert!(a.to_bytes() < b.to_bytes());
        assert_eq!(PendingKey::from_bytes(&[0; 10]), None);
    }
}
