use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("failed to build signature checker thread pool: {0}")]
    ThreadPool(String),
}
