//! Batched signature verification for state and open blocks.
//!
//! Each queued block is checked against the key that should have signed it:
//! the epoch signer when its link is an epoch link, otherwise the account the
//! submitter vouched for, otherwise the block's own account.

use std::sync::Arc;

use lattice_crypto::{SignatureCheck, SignatureChecker};
use lattice_types::{Epochs, SignatureVerification};

use crate::QueuedBlock;

pub struct StateBlockVerifier {
    checker: Arc<SignatureChecker>,
    epochs: Epochs,
}

impl StateBlockVerifier {
    pub fn new(checker: Arc<SignatureChecker>, epochs: Epochs) -> Self {
        Self { checker, epochs }
    }

    /// One verdict per item, in input order.
    ///
    /// A failed check against the epoch signer yields `Unknown` rather than
    /// `Invalid`: the block may be an ordinary send to the epoch link account,
    /// which the ledger verifies against the account key itself.
    pub fn verify(&self, items: &[QueuedBlock]) -> Vec<SignatureVerification> {
        let mut epoch_signed = Vec::with_capacity(items.len());
        let checks: Vec<SignatureCheck> = items
            .iter()
            .map(|item| {
                let block = &item.block;
                let link = block.link();
                let epoch_signer = if link.is_zero() {
                    None
                } else {
                    self.epochs.signer(&link)
                };
                epoch_signed.push(epoch_signer.is_some());
                let public_key = match epoch_signer {
                    Some(signer) => signer,
                    None if !item.account.is_zero() => item.account,
                    None => block.account(),
                };
                SignatureCheck {
                    message: *block.hash().as_bytes(),
                    public_key,
                    signature: block.signature().clone(),
                }
            })
            .collect();

        self.checker
            .verify(&checks)
            .into_iter()
            .zip(epoch_signed)
            .map(|(valid, epoch)| match (valid, epoch) {
                (true, true) => SignatureVerification::ValidEpoch,
                (true, false) => SignatureVerification::Valid,
                (false, true) => SignatureVerification::Unknown,
                (false, false) => SignatureVerification::Invalid,
            })
            .collect()
    }
}
