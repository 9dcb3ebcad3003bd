//! Abstract storage contract for the block-lattice ledger.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these traits.
//! The ledger and block processor depend only on the traits.
//!
//! All table access goes through a transaction. A backend supports any number of
//! concurrent read transactions (consistent snapshots) and at most one write
//! transaction at a time. Writes become visible to new readers on
//! [`WriteTxn::commit`]; dropping a write transaction without committing discards it.

pub mod account;
pub mod block;
pub mod error;
pub mod frontier;
pub mod meta;
pub mod pending;
pub mod rep_weights;
pub mod unchecked;

pub use account::{AccountInfo, AccountStore, AccountStoreMut};
pub use block::{BlockDetails, BlockSideband, BlockStore, BlockStoreMut, StoredBlock};
pub use error::StoreError;
pub use frontier::{FrontierStore, FrontierStoreMut};
pub use meta::{MetaStore, MetaStoreMut, STORE_VERSION};
pub use pending::{PendingInfo, PendingKey, PendingStore, PendingStoreMut};
pub use rep_weights::{RepWeightStore, RepWeightStoreMut};
pub use unchecked::{UncheckedInfo, UncheckedKey, UncheckedStore, UncheckedStoreMut};

/// Read access to every table.
pub trait ReadTxn:
    AccountStore + BlockStore + PendingStore + FrontierStore + RepWeightStore + UncheckedStore + MetaStore
{
}

impl<T> ReadTxn for T where
    T: AccountStore
        + BlockStore
        + PendingStore
        + FrontierStore
        + RepWeightStore
        + UncheckedStore
        + MetaStore
{
}

/// Read and write access to every table.
pub trait WriteTxn:
    ReadTxn
    + AccountStoreMut
    + BlockStoreMut
    + PendingStoreMut
    + FrontierStoreMut
    + RepWeightStoreMut
    + UncheckedStoreMut
    + MetaStoreMut
{
    /// Make every write in this transaction durable and visible atomically.
    fn commit(self) -> Result<(), StoreError>
    where
        Self: Sized;
}

/// A transactional store that hands out read snapshots and the single writer.
pub trait Store: Send + Sync {
    type Read<'a>: ReadTxn
    where
        Self: 'a;
    type Write<'a>: WriteTxn
    where
        Self: 'a;

    fn tx_begin_read(&self) -> Result<Self::Read<'_>, StoreError>;

    /// Blocks while another write transaction is open.
    fn tx_begin_write(&self) -> Result<Self::Write<'_>, StoreError>;
}
