//! Thread-safe in-memory store for tests.
//!
//! Committed state is an immutable `Arc<Tables>` snapshot. Readers clone the
//! `Arc`; the writer copies the tables, mutates its private copy, and swaps it in
//! on commit.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use lattice_store::{
    AccountInfo, AccountStore, AccountStoreMut, BlockSideband, BlockStore, BlockStoreMut,
    FrontierStore, FrontierStoreMut, MetaStore, MetaStoreMut, PendingInfo, PendingKey,
    PendingStore, PendingStoreMut, RepWeightStore, RepWeightStoreMut, Store, StoreError,
    StoredBlock, UncheckedInfo, UncheckedKey, UncheckedStore, UncheckedStoreMut, WriteTxn,
};
use lattice_types::{Account, Amount, Block, BlockHash};

#[derive(Clone, Default)]
struct Tables {
    accounts: BTreeMap<Account, AccountInfo>,
    blocks: HashMap<BlockHash, StoredBlock>,
    successors: HashMap<BlockHash, BlockHash>,
    pending: BTreeMap<PendingKey, PendingInfo>,
    frontiers: HashMap<BlockHash, Account>,
    weights: BTreeMap<Account, Amount>,
    unchecked: BTreeMap<UncheckedKey, UncheckedInfo>,
    version: Option<u32>,
}

/// An in-memory store for testing.
#[derive(Default)]
pub struct NullStore {
    committed: RwLock<Arc<Tables>>,
    writer: Mutex<()>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Result<Arc<Tables>, StoreError> {
        self.committed
            .read()
            .map(|tables| Arc::clone(&tables))
            .map_err(|_| StoreError::Backend("null store lock poisoned".into()))
    }
}

pub struct NullReadTxn {
    tables: Arc<Tables>,
}

pub struct NullWriteTxn<'a> {
    store: &'a NullStore,
    tables: Tables,
    _writer: MutexGuard<'a, ()>,
}

impl Store for NullStore {
    type Read<'a> = NullReadTxn;
    type Write<'a> = NullWriteTxn<'a>;

    fn tx_begin_read(&self) -> Result<NullReadTxn, StoreError> {
        Ok(NullReadTxn {
            tables: self.snapshot()?,
        })
    }

    fn tx_begin_write(&self) -> Result<NullWriteTxn<'_>, StoreError> {
        let writer = self
            .writer
            .lock()
            .map_err(|_| StoreError::Backend("null store writer lock poisoned".into()))?;
        let tables = (*self.snapshot()?).clone();
        Ok(NullWriteTxn {
            store: self,
            tables,
            _writer: writer,
        })
    }
}

impl WriteTxn for NullWriteTxn<'_> {
    fn commit(self) -> Result<(), StoreError> {
        let mut committed = self
            .store
            .committed
            .write()
            .map_err(|_| StoreError::Backend("null store lock poisoned".into()))?;
        *committed = Arc::new(self.tables);
        Ok(())
    }
}

macro_rules! impl_reads {
    ($txn:ty) => {
        impl AccountStore for $txn {
            fn get_account(&self, account: &Account) -> Result<Option<AccountInfo>, StoreError> {
                Ok(self.tables.accounts.get(account).cloned())
            }

            fn account_count(&self) -> Result<u64, StoreError> {
                Ok(self.tables.accounts.len() as u64)
            }

            fn accounts(&self) -> Result<Vec<(Account, AccountInfo)>, StoreError> {
                Ok(self
                    .tables
                    .accounts
                    .iter()
                    .map(|(a, i)| (*a, i.clone()))
                    .collect())
            }
        }

        impl BlockStore for $txn {
            fn get_block(&self, hash: &BlockHash) -> Result<Option<StoredBlock>, StoreError> {
                Ok(self.tables.blocks.get(hash).cloned())
            }

            fn block_exists(&self, hash: &BlockHash) -> Result<bool, StoreError> {
                Ok(self.tables.blocks.contains_key(hash))
            }

            fn block_count(&self) -> Result<u64, StoreError> {
                Ok(self.tables.blocks.len() as u64)
            }

            fn get_successor(&self, hash: &BlockHash) -> Result<Option<BlockHash>, StoreError> {
                Ok(self.tables.successors.get(hash).copied())
            }
        }

        impl PendingStore for $txn {
            fn get_pending(&self, key: &PendingKey) -> Result<Option<PendingInfo>, StoreError> {
                Ok(self.tables.pending.get(key).cloned())
            }

            fn pending_for_account(
                &self,
                account: &Account,
            ) -> Result<Vec<(PendingKey, PendingInfo)>, StoreError> {
                let start = PendingKey::new(*account, BlockHash::ZERO);
                Ok(self
                    .tables
                    .pending
                    .range(start..)
                    .take_while(|(key, _)| key.account == *account)
                    .map(|(key, info)| (*key, info.clone()))
                    .collect())
            }

            fn pending_count(&self) -> Result<u64, StoreError> {
                Ok(self.tables.pending.len() as u64)
            }
        }

        impl FrontierStore for $txn {
            fn get_frontier(&self, head: &BlockHash) -> Result<Option<Account>, StoreError> {
                Ok(self.tables.frontiers.get(head).copied())
            }

            fn frontier_count(&self) -> Result<u64, StoreError> {
                Ok(self.tables.frontiers.len() as u64)
            }
        }

        impl RepWeightStore for $txn {
            fn get_weight(&self, representative: &Account) -> Result<Amount, StoreError> {
                Ok(self
                    .tables
                    .weights
                    .get(representative)
                    .copied()
                    .unwrap_or_default())
            }

            fn rep_weights(&self) -> Result<Vec<(Account, Amount)>, StoreError> {
                Ok(self.tables.weights.iter().map(|(a, w)| (*a, *w)).collect())
            }
        }

        impl UncheckedStore for $txn {
            fn get_unchecked(
                &self,
                dependency: &BlockHash,
            ) -> Result<Vec<(UncheckedKey, UncheckedInfo)>, StoreError> {
                let start = UncheckedKey::new(*dependency, BlockHash::ZERO);
                Ok(self
                    .tables
                    .unchecked
                    .range(start..)
                    .take_while(|(key, _)| key.dependency == *dependency)
                    .map(|(key, info)| (*key, info.clone()))
                    .collect())
            }

            fn unchecked_exists(&self, key: &UncheckedKey) -> Result<bool, StoreError> {
                Ok(self.tables.unchecked.contains_key(key))
            }

            fn unchecked_count(&self) -> Result<u64, StoreError> {
                Ok(self.tables.unchecked.len() as u64)
            }
        }

        impl MetaStore for $txn {
            fn get_version(&self) -> Result<Option<u32>, StoreError> {
                Ok(self.tables.version)
            }
        }
    };
}

impl_reads!(NullReadTxn);
impl_reads!(NullWriteTxn<'_>);

impl AccountStoreMut for NullWriteTxn<'_> {
    fn put_account(&mut self, account: &Account, info: &AccountInfo) -> Result<(), StoreError> {
        self.tables.accounts.insert(*account, info.clone());
        Ok(())
    }

    fn delete_account(&mut self, account: &Account) -> Result<(), StoreError> {
        self.tables.accounts.remove(account);
        Ok(())
    }
}

impl BlockStoreMut for NullWriteTxn<'_> {
    fn put_block(&mut self, block: &Block, sideband: &BlockSideband) -> Result<(), StoreError> {
        self.tables.blocks.insert(
            block.hash(),
            StoredBlock {
                block: block.clone(),
                sideband: sideband.clone(),
            },
        );
        Ok(())
    }

    fn delete_block(&mut self, hash: &BlockHash) -> Result<(), StoreError> {
        self.tables.blocks.remove(hash);
        Ok(())
    }

    fn put_successor(
        &mut self,
        hash: &BlockHash,
        successor: &BlockHash,
    ) -> Result<(), StoreError> {
        self.tables.successors.insert(*hash, *successor);
        Ok(())
    }

    fn delete_successor(&mut self, hash: &BlockHash) -> Result<(), StoreError> {
        self.tables.successors.remove(hash);
        Ok(())
    }
}

impl PendingStoreMut for NullWriteTxn<'_> {
    fn put_pending(&mut self, key: &PendingKey, info: &PendingInfo) -> Result<(), StoreError> {
        self.tables.pending.insert(*key, info.clone());
        Ok(())
    }

    fn delete_pending(&mut self, key: &PendingKey) -> Result<(), StoreError> {
        self.tables.pending.remove(key);
        Ok(())
    }
}

impl FrontierStoreMut for NullWriteTxn<'_> {
    fn put_frontier(&mut self, head: &BlockHash, account: &Account) -> Result<(), StoreError> {
        self.tables.frontiers.insert(*head, *account);
        Ok(())
    }

    fn delete_frontier(&mut self, head: &BlockHash) -> Result<(), StoreError> {
        self.tables.frontiers.remove(head);
        Ok(())
    }
}

impl RepWeightStoreMut for NullWriteTxn<'_> {
    fn put_weight(&mut self, representative: &Account, weight: Amount) -> Result<(), StoreError> {
        if weight.is_zero() {
            self.tables.weights.remove(representative);
        } else {
            self.tables.weights.insert(*representative, weight);
        }
        Ok(())
    }
}

impl UncheckedStoreMut for NullWriteTxn<'_> {
    fn put_unchecked(
        &mut self,
        key: &UncheckedKey,
        info: &UncheckedInfo,
    ) -> Result<(), StoreError> {
        self.tables.unchecked.insert(*key, info.clone());
        Ok(())
    }

    fn delete_unchecked(&mut self, key: &UncheckedKey) -> Result<(), StoreError> {
        self.tables.unchecked.remove(key);
        Ok(())
    }
}

impl MetaStoreMut for NullWriteTxn<'_> {
    fn put_version(&mut self, version: u32) -> Result<(), StoreError> {
        self.tables.version = Some(version);
        Ok(())
    }
}
