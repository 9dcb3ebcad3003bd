//! Batched signature verification.
//!
//! State and open blocks dominate ingest volume, so the block processor collects
//! them and verifies whole batches at once. The checker owns its worker pool; it
//! is constructed at node startup and handed to whoever needs it.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use lattice_types::{Account, Signature};

use crate::sign::verify_signature;
use crate::CryptoError;

/// Items per rayon task. Below this the scheduling overhead dominates.
const MIN_CHUNK: usize = 64;

/// One signature to check: a 32-byte message (a block hash), the expected
/// signer, and the signature.
#[derive(Clone, Debug)]
pub struct SignatureCheck {
    pub message: [u8; 32],
    pub public_key: Account,
    pub signature: Signature,
}

pub struct SignatureChecker {
    pool: Option<ThreadPool>,
}

impl SignatureChecker {
    /// `threads == 0` verifies on the calling thread.
    pub fn new(threads: usize) -> Result<Self, CryptoError> {
        let pool = if threads == 0 {
            None
        } else {
            Some(
                ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("sig-check-{i}"))
                    .build()
                    .map_err(|e| CryptoError::ThreadPool(e.to_string()))?,
            )
        };
        Ok(Self { pool })
    }

    /// Verify every item; results are in input order.
    pub fn verify(&self, batch: &[SignatureCheck]) -> Vec<bool> {
        match &self.pool {
            Some(pool) if batch.len() > MIN_CHUNK => pool.install(|| {
                batch
                    .par_iter()
                    .with_min_len(MIN_CHUNK)
                    .map(check_one)
                    .collect()
            }),
            _ => batch.iter().map(check_one).collect(),
        }
    }
}

fn check_one(item: &SignatureCheck) -> bool {
    verify_signature(&item.message, &item.signature, &item.public_key)
}
