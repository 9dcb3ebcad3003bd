use std::fmt;

use lattice_types::{Account, Amount, SignatureVerification};

/// Verdict of [`crate::Ledger::process`] for one block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProcessResult {
    /// Block was applied to the ledger.
    Progress,
    /// Signature does not verify against the account or epoch signer.
    BadSignature,
    /// Block is already in the ledger.
    Old,
    /// Send balance is higher than the account balance.
    NegativeSpend,
    /// A different block already occupies this position.
    Fork,
    /// Source has no matching pending entry, or cannot be received by this block type.
    Unreceivable,
    /// Previous block is not in the ledger yet.
    GapPrevious,
    /// Source block is not in the ledger yet.
    GapSource,
    /// Attempt to open the all-zero account.
    OpenedBurnAccount,
    /// Balance change does not match the received amount.
    BalanceMismatch,
    /// Epoch block changes the representative.
    RepresentativeMismatch,
    /// Block type cannot follow its predecessor, or epoch out of sequence.
    BlockPosition,
}

impl ProcessResult {
    pub const ALL: [ProcessResult; 12] = [
        ProcessResult::Progress,
        ProcessResult::BadSignature,
        ProcessResult::Old,
        ProcessResult::NegativeSpend,
        ProcessResult::Fork,
        ProcessResult::Unreceivable,
        ProcessResult::GapPrevious,
        ProcessResult::GapSource,
        ProcessResult::OpenedBurnAccount,
        ProcessResult::BalanceMismatch,
        ProcessResult::RepresentativeMismatch,
        ProcessResult::BlockPosition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessResult::Progress => "progress",
            ProcessResult::BadSignature => "bad_signature",
            ProcessResult::Old => "old",
            ProcessResult::NegativeSpend => "negative_spend",
            ProcessResult::Fork => "fork",
            ProcessResult::Unreceivable => "unreceivable",
            ProcessResult::GapPrevious => "gap_previous",
            ProcessResult::GapSource => "gap_source",
            ProcessResult::OpenedBurnAccount => "opened_burn_account",
            ProcessResult::BalanceMismatch => "balance_mismatch",
            ProcessResult::RepresentativeMismatch => "representative_mismatch",
            ProcessResult::BlockPosition => "block_position",
        }
    }

    /// Dependency timing or duplicate delivery rather than a property of the block.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProcessResult::Old | ProcessResult::GapPrevious | ProcessResult::GapSource
        )
    }
}

impl fmt::Display for ProcessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full outcome of processing one block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessReturn {
    pub code: ProcessResult,
    /// Owner of the block, set on progress.
    pub account: Account,
    /// Amount moved by the block (sent, received, or zero).
    pub amount: Amount,
    /// Destination of a send, set on progress.
    pub pending_account: Account,
    /// Signature knowledge after processing; may be upgraded from the caller's hint.
    pub verified: SignatureVerification,
    /// Account balance before the block.
    pub previous_balance: Amount,
}

impl ProcessReturn {
    pub(crate) fn new(verified: SignatureVerification) -> Self {
        Self {
            code: ProcessResult::Progress,
            account: Account::ZERO,
            amount: Amount::ZERO,
            pending_account: Account::ZERO,
            verified,
            previous_balance: Amount::ZERO,
        }
    }
}
