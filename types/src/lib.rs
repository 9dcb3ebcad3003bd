//! Fundamental types for the block-lattice ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! 256-bit identifiers, amounts, keys and signatures, epochs, timestamps, and the
//! five block variants together with their bit-exact binary encoding.

pub mod amount;
pub mod block;
pub mod epoch;
pub mod error;
pub mod hash;
pub mod keys;
pub mod time;
pub mod verification;

pub use amount::Amount;
pub use block::{
    Block, BlockType, ChangeBlock, ChangeHashables, OpenBlock, OpenHashables, ReceiveBlock,
    ReceiveHashables, SendBlock, SendHashables, StateBlock, StateHashables,
};
pub use epoch::{Epoch, EpochInfo, Epochs};
pub use error::BlockDecodeError;
pub use hash::{Account, BlockHash, Link, QualifiedRoot, Root};
pub use keys::{KeyPair, PrivateKey, Signature};
pub use time::Timestamp;
pub use verification::SignatureVerification;
