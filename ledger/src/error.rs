use lattice_store::StoreError;
use lattice_types::BlockHash;
use thiserror::Error;

/// Faults that stop a ledger operation. Validation verdicts are not errors; they
/// are reported through [`crate::ProcessResult`].
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("block not found: {0}")]
    BlockNotFound(BlockHash),

    #[error("ledger inconsistency: {0}")]
    Inconsistent(String),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}
