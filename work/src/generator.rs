//! PoW generation (multi-threaded CPU).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use rayon::prelude::*;

use crate::validator::work_value;
use crate::WorkError;
use lattice_types::Root;

/// Generates proof-of-work for a root using all available CPU cores.
#[derive(Default)]
pub struct WorkGenerator {
    cancelled: AtomicBool,
}

/// Nonces tried per thread before checking for a result or cancellation.
const BATCH_SIZE: u64 = 4096;

impl WorkGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a work value for `root` that reaches `threshold`.
    ///
    /// Splits the nonce space across rayon's threads. The first thread to find a
    /// valid nonce signals the others to stop.
    pub fn generate(&self, root: &Root, threshold: u64) -> Result<u64, WorkError> {
        if threshold == 0 {
            return Ok(0);
        }

        let found = AtomicU64::new(0);
        let done = AtomicBool::new(false);
        let num_threads = rayon::current_num_threads().max(1);
        let stride = num_threads as u64;

        (0..num_threads).into_par_iter().for_each(|thread_id| {
            let mut nonce = thread_id as u64;
            loop {
                if done.load(Ordering::Relaxed) || self.cancelled.load(Ordering::Relaxed) {
                    return;
                }
                for _ in 0..BATCH_SIZE {
                    if work_value(root, nonce) >= threshold {
                        if !done.swap(true, Ordering::AcqRel) {
                            found.store(nonce, Ordering::Release);
                        }
                        return;
                    }
                    nonce = nonce.wrapping_add(stride);
                }
            }
        });

        if done.load(Ordering::Acquire) {
            Ok(found.load(Ordering::Acquire))
        } else {
            Err(WorkError::Cancelled)
        }
    }

    /// Stop all in-flight and future generation on this generator.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}
