//! Events emitted by the block processor for subscribers.

use std::sync::{Arc, PoisonError, RwLock};

use lattice_ledger::ProcessResult;
use lattice_types::{Block, BlockHash};

/// What the block processor observed while committing a batch.
#[derive(Clone, Debug)]
pub enum ProcessorEvent {
    /// A recently arrived block was committed; consensus should start voting on it.
    Live {
        block: Arc<Block>,
        result: ProcessResult,
    },
    /// A block was parked until `dependency` arrives.
    Gap {
        hash: BlockHash,
        dependency: BlockHash,
    },
    /// Blocks waiting on `dependency` were re-queued.
    GapResolved { dependency: BlockHash },
    /// An old block lost a race for its root and needs fork resolution.
    Fork { block: Arc<Block> },
    /// A forced block displaced the blocks in `undone`.
    RolledBack {
        winner: BlockHash,
        undone: Vec<BlockHash>,
    },
    /// The ledger refused the block for good.
    Rejected {
        hash: BlockHash,
        result: ProcessResult,
    },
}

type Listener = Box<dyn Fn(&ProcessorEvent) + Send + Sync>;

/// Synchronous fan-out event bus.
///
/// Listeners are invoked inline on the processor thread after the batch's
/// transaction has been committed; keep handlers fast to avoid stalling
/// block processing.
pub struct EventBus {
    listeners: RwLock<Vec<Listener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, listener: Listener) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub fn emit(&self, event: &ProcessorEvent) {
        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.iter() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
