//! Block processor for the block-lattice ledger.
//!
//! The processor is the only component that writes to the ledger. It:
//! - Queues blocks arriving from any thread, deduplicating resubmissions
//! - Verifies state block signatures in batches
//! - Commits blocks in bounded write transactions on one worker thread
//! - Parks blocks with missing dependencies and retries them on arrival
//! - Rolls back competing chains for forced blocks
//! - Reports verdicts to subscribers and Prometheus

pub mod block_processor;
pub mod block_uniquer;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod metrics;
pub mod rolled_back;
pub mod signature_verification;

pub use block_processor::{BlockProcessor, QueuedBlock};
pub use block_uniquer::BlockUniquer;
pub use config::{BlockProcessorConfig, Network, NodeConfig};
pub use error::NodeError;
pub use events::{EventBus, ProcessorEvent};
pub use logging::{init_logging, LogFormat};
pub use metrics::ProcessorMetrics;
pub use rolled_back::RolledBack;
pub use signature_verification::StateBlockVerifier;
