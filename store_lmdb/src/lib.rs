//! LMDB storage backend for the block-lattice ledger.
//!
//! Implements the `lattice-store` contract with the `heed` LMDB bindings. Every
//! table is a named database inside a single environment, so one LMDB write
//! transaction spans all tables. LMDB itself provides the concurrency model the
//! contract asks for: MVCC read snapshots and a single writer.

mod account;
mod block;
mod environment;
mod error;
mod frontier;
mod meta;
mod pending;
mod rep_weights;
mod transaction;
mod unchecked;

pub use environment::{LmdbConfig, LmdbStore};
pub use error::LmdbError;
pub use transaction::{LmdbReadTxn, LmdbWriteTxn};
