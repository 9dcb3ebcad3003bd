//! Anti-spam proof-of-work.
//!
//! A work value is the 64-bit Blake2b digest of `work (LE) || root`. A block's work
//! is valid when that value reaches the network threshold. Validation is a single
//! hash and is done before any signature or ledger work is spent on a block.

pub mod error;
pub mod generator;
pub mod thresholds;
pub mod validator;

pub use error::WorkError;
pub use generator::WorkGenerator;
pub use thresholds::WorkThresholds;
pub use validator::{validate_work, work_value};
