//! Read and write transactions implementing the storage contract.

use heed::{RoTxn, RwTxn};

use lattice_store::{
    AccountInfo, AccountStore, AccountStoreMut, BlockSideband, BlockStore, BlockStoreMut,
    FrontierStore, FrontierStoreMut, MetaStore, MetaStoreMut, PendingInfo, PendingKey,
    PendingStore, PendingStoreMut, RepWeightStore, RepWeightStoreMut, StoreError, StoredBlock,
    UncheckedInfo, UncheckedKey, UncheckedStore, UncheckedStoreMut, WriteTxn,
};
use lattice_types::{Account, Amount, Block, BlockHash};

use crate::environment::Databases;
use crate::{account, block, frontier, meta, pending, rep_weights, unchecked, LmdbError};

/// A consistent read snapshot.
pub struct LmdbReadTxn<'a> {
    txn: RoTxn<'a>,
    dbs: Databases,
}

impl<'a> LmdbReadTxn<'a> {
    pub(crate) fn new(txn: RoTxn<'a>, dbs: Databases) -> Self {
        Self { txn, dbs }
    }
}

/// The single write transaction. Dropping it without [`WriteTxn::commit`] aborts.
pub struct LmdbWriteTxn<'a> {
    txn: RwTxn<'a>,
    dbs: Databases,
}

impl<'a> LmdbWriteTxn<'a> {
    pub(crate) fn new(txn: RwTxn<'a>, dbs: Databases) -> Self {
        Self { txn, dbs }
    }
}

macro_rules! impl_reads {
    ($txn:ident) => {
        impl AccountStore for $txn<'_> {
            fn get_account(&self, account: &Account) -> Result<Option<AccountInfo>, StoreError> {
                Ok(account::get(&self.txn, &self.dbs, account)?)
            }

            fn account_count(&self) -> Result<u64, StoreError> {
                Ok(account::count(&self.txn, &self.dbs)?)
            }

            fn accounts(&self) -> Result<Vec<(Account, AccountInfo)>, StoreError> {
                Ok(account::iter(&self.txn, &self.dbs)?)
            }
        }

        impl BlockStore for $txn<'_> {
            fn get_block(&self, hash: &BlockHash) -> Result<Option<StoredBlock>, StoreError> {
                block::get(&self.txn, &self.dbs, hash)
            }

            fn block_exists(&self, hash: &BlockHash) -> Result<bool, StoreError> {
                Ok(block::exists(&self.txn, &self.dbs, hash)?)
            }

            fn block_count(&self) -> Result<u64, StoreError> {
                Ok(block::count(&self.txn, &self.dbs)?)
            }

            fn get_successor(&self, hash: &BlockHash) -> Result<Option<BlockHash>, StoreError> {
                Ok(block::successor(&self.txn, &self.dbs, hash)?)
            }
        }

        impl PendingStore for $txn<'_> {
            fn get_pending(&self, key: &PendingKey) -> Result<Option<PendingInfo>, StoreError> {
                Ok(pending::get(&self.txn, &self.dbs, key)?)
            }

            fn pending_for_account(
                &self,
                account: &Account,
            ) -> Result<Vec<(PendingKey, PendingInfo)>, StoreError> {
                Ok(pending::for_account(&self.txn, &self.dbs, account)?)
            }

            fn pending_count(&self) -> Result<u64, StoreError> {
                Ok(pending::count(&self.txn, &self.dbs)?)
            }
        }

        impl FrontierStore for $txn<'_> {
            fn get_frontier(&self, head: &BlockHash) -> Result<Option<Account>, StoreError> {
                Ok(frontier::get(&self.txn, &self.dbs, head)?)
            }

            fn frontier_count(&self) -> Result<u64, StoreError> {
                Ok(frontier::count(&self.txn, &self.dbs)?)
            }
        }

        impl RepWeightStore for $txn<'_> {
            fn get_weight(&self, representative: &Account) -> Result<Amount, StoreError> {
                Ok(rep_weights::get(&self.txn, &self.dbs, representative)?)
            }

            fn rep_weights(&self) -> Result<Vec<(Account, Amount)>, StoreError> {
                Ok(rep_weights::iter(&self.txn, &self.dbs)?)
            }
        }

        impl UncheckedStore for $txn<'_> {
            fn get_unchecked(
                &self,
                dependency: &BlockHash,
            ) -> Result<Vec<(UncheckedKey, UncheckedInfo)>, StoreError> {
                Ok(unchecked::get(&self.txn, &self.dbs, dependency)?)
            }

            fn unchecked_exists(&self, key: &UncheckedKey) -> Result<bool, StoreError> {
                Ok(unchecked::exists(&self.txn, &self.dbs, key)?)
            }

            fn unchecked_count(&self) -> Result<u64, StoreError> {
                Ok(unchecked::count(&self.txn, &self.dbs)?)
            }
        }

        impl MetaStore for $txn<'_> {
            fn get_version(&self) -> Result<Option<u32>, StoreError> {
                Ok(meta::get_version(&self.txn, &self.dbs)?)
            }
        }
    };
}

impl_reads!(LmdbReadTxn);
impl_reads!(LmdbWriteTxn);

impl AccountStoreMut for LmdbWriteTxn<'_> {
    fn put_account(&mut self, account: &Account, info: &AccountInfo) -> Result<(), StoreError> {
        Ok(account::put(&mut self.txn, &self.dbs, account, info)?)
    }

    fn delete_account(&mut self, account: &Account) -> Result<(), StoreError> {
        Ok(account::delete(&mut self.txn, &self.dbs, account)?)
    }
}

impl BlockStoreMut for LmdbWriteTxn<'_> {
    fn put_block(&mut self, block: &Block, sideband: &BlockSideband) -> Result<(), StoreError> {
        block::put(&mut self.txn, &self.dbs, block, sideband)
    }

    fn delete_block(&mut self, hash: &BlockHash) -> Result<(), StoreError> {
        Ok(block::delete(&mut self.txn, &self.dbs, hash)?)
    }

    fn put_successor(&mut self, hash: &BlockHash, successor: &BlockHash) -> Result<(), StoreError> {
        Ok(block::put_successor(&mut self.txn, &self.dbs, hash, successor)?)
    }

    fn delete_successor(&mut self, hash: &BlockHash) -> Result<(), StoreError> {
        Ok(block::delete_successor(&mut self.txn, &self.dbs, hash)?)
    }
}

impl PendingStoreMut for LmdbWriteTxn<'_> {
    fn put_pending(&mut self, key: &PendingKey, info: &PendingInfo) -> Result<(), StoreError> {
        Ok(pending::put(&mut self.txn, &self.dbs, key, info)?)
    }

    fn delete_pending(&mut self, key: &PendingKey) -> Result<(), StoreError> {
        Ok(pending::delete(&mut self.txn, &self.dbs, key)?)
    }
}

impl FrontierStoreMut for LmdbWriteTxn<'_> {
    fn put_frontier(&mut self, head: &BlockHash, account: &Account) -> Result<(), StoreError> {
        Ok(frontier::put(&mut self.txn, &self.dbs, head, account)?)
    }

    fn delete_frontier(&mut self, head: &BlockHash) -> Result<(), StoreError> {
        Ok(frontier::delete(&mut self.txn, &self.dbs, head)?)
    }
}

impl RepWeightStoreMut for LmdbWriteTxn<'_> {
    fn put_weight(&mut self, representative: &Account, weight: Amount) -> Result<(), StoreError> {
        Ok(rep_weights::put(&mut self.txn, &self.dbs, representative, weight)?)
    }
}

impl UncheckedStoreMut for LmdbWriteTxn<'_> {
    fn put_unchecked(&mut self, key: &UncheckedKey, info: &UncheckedInfo) -> Result<(), StoreError> {
        Ok(unchecked::put(&mut self.txn, &self.dbs, key, info)?)
    }

    fn delete_unchecked(&mut self, key: &UncheckedKey) -> Result<(), StoreError> {
        Ok(unchecked::delete(&mut self.txn, &self.dbs, key)?)
    }
}

impl MetaStoreMut for LmdbWriteTxn<'_> {
    fn put_version(&mut self, version: u32) -> Result<(), StoreError> {
        Ok(meta::put_version(&mut self.txn, &self.dbs, version)?)
    }
}

impl WriteTxn for LmdbWriteTxn<'_> {
    fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
