use thiserror::Error;

/// Failure to decode a block or identifier from bytes or text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlockDecodeError {
    #[error("unknown block type code {0}")]
    UnknownType(u8),

    #[error("truncated {block_type} block: need {expected} bytes, have {actual}")]
    Truncated {
        block_type: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("empty buffer")]
    Empty,

    #[error("invalid hex: {0}")]
    InvalidHex(String),
}
