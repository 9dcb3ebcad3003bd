use thiserror::Error;

use lattice_store::StoreError;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(#[from] heed::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("malformed {table} record")]
    Malformed { table: &'static str },

    #[error("store version {found} does not match expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },
}

impl From<LmdbError> for StoreError {
    fn from(e: LmdbError) -> Self {
        match e {
            LmdbError::Heed(_) => StoreError::Backend(e.to_string()),
            LmdbError::Serialization(_) => StoreError::Serialization(e.to_string()),
            LmdbError::Malformed { .. } | LmdbError::VersionMismatch { .. } => {
                StoreError::Corruption(e.to_string())
            }
        }
    }
}
