//! Cryptographic primitives for the block-lattice ledger.
//!
//! - **Ed25519** for account keys, block signing and signature verification
//! - **Blake2b** for hashing (256-bit general purpose, 64-bit for work values)
//! - A batched [`SignatureChecker`] that verifies many signatures in parallel

pub mod batch;
pub mod block;
pub mod error;
pub mod hash;
pub mod keys;
pub mod sign;

pub use batch::{SignatureCheck, SignatureChecker};
pub use block::{
    change_block, open_block, receive_block, send_block, sign_hash, state_block,
    verify_block_signature,
};
pub use error::CryptoError;
pub use hash::{blake2b_256, blake2b_256_multi, blake2b_64_multi};
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use sign::{sign_message, verify_signature};
