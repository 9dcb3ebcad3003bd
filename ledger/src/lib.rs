//! Block-lattice ledger.
//!
//! Every account owns its own chain of blocks. The ledger decides whether a
//! block may be appended to its chain, applies the resulting balance, pending
//! and representative weight changes, and can undo the most recent blocks of a
//! chain when a competing block wins.
//!
//! All operations take a transaction from a [`lattice_store::Store`]; the
//! ledger itself keeps no table state.

pub mod constants;
pub mod error;
pub mod ledger;
mod process;
pub mod result;
mod rollback;

pub use constants::LedgerConstants;
pub use error::LedgerError;
pub use ledger::Ledger;
pub use result::{ProcessResult, ProcessReturn};
