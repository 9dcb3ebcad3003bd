use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("ledger error: {0}")]
    Ledger(#[from] lattice_ledger::LedgerError),

    #[error("store error: {0}")]
    Store(#[from] lattice_store::StoreError),

    #[error("crypto error: {0}")]
    Crypto(#[from] lattice_crypto::CryptoError),

    #[error("config error: {0}")]
    Config(String),

    #[error("logging error: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("block processor is already running")]
    AlreadyStarted,
}
