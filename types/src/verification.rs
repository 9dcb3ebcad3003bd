use serde::{Deserialize, Serialize};

/// What is already known about a block's signature when it reaches the ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureVerification {
    #[default]
    Unknown,
    Invalid,
    /// Verified against the account key.
    Valid,
    /// Verified against the epoch signer for the block's link.
    ValidEpoch,
}
