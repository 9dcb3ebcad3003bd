//! Nullable infrastructure for deterministic testing.
//!
//! [`NullStore`] implements the full transactional store contract in memory:
//! snapshot reads, a single writer, atomic commit, and discard on drop. It never
//! touches the filesystem, so ledger and block processor tests can run against
//! it directly.

pub mod store;

pub use store::{NullReadTxn, NullStore, NullWriteTxn};
