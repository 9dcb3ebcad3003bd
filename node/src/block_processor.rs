//! Block processing pipeline.
//!
//! Producers on any thread hand blocks to [`BlockProcessor::add`] or
//! [`BlockProcessor::force`]. A single worker thread drains the queues in
//! batches: state and open blocks first go through batched signature
//! verification, then every block is committed to the ledger inside one write
//! transaction per batch. All ledger mutation goes through this thread, which
//! makes it the only writer.
//!
//! Verdicts drive the retry policy. Blocks with a missing dependency are parked
//! in the unchecked table and re-queued when the dependency commits; forced
//! blocks roll back whatever currently occupies their root; everything else is
//! reported through the [`EventBus`].

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use lattice_crypto::SignatureChecker;
use lattice_ledger::{Ledger, ProcessResult, ProcessReturn};
use lattice_store::{ReadTxn, Store, UncheckedInfo, UncheckedKey, WriteTxn};
use lattice_types::{Account, Block, BlockHash, BlockType, SignatureVerification, Timestamp};
use lattice_work::WorkThresholds;

use crate::{
    BlockProcessorConfig, BlockUniquer, EventBus, NodeError, ProcessorEvent, ProcessorMetrics,
    RolledBack, StateBlockVerifier,
};

/// Blocks committed between two interleaved signature verification rounds.
const VERIFY_INTERVAL: usize = 256;
/// Batches slower than this are logged.
const SLOW_BATCH: Duration = Duration::from_millis(100);
/// Queue depth above which the backlog is reported.
const BACKLOG_LOG_THRESHOLD: usize = 64;
const BACKLOG_LOG_INTERVAL: Duration = Duration::from_secs(15);

/// A block waiting in one of the processor's queues.
#[derive(Clone, Debug)]
pub struct QueuedBlock {
    pub block: Arc<Block>,
    /// Account the submitter vouches for; zero when unknown.
    pub account: Account,
    /// When the block first arrived.
    pub modified: Timestamp,
    pub verified: SignatureVerification,
}

impl QueuedBlock {
    pub fn new(block: Arc<Block>, modified: Timestamp) -> Self {
        Self {
            block,
            account: Account::ZERO,
            modified,
            verified: SignatureVerification::Unknown,
        }
    }

    fn to_unchecked(&self, verified: SignatureVerification) -> UncheckedInfo {
        UncheckedInfo {
            block: (*self.block).clone(),
            account: self.account,
            modified: self.modified,
            verified,
        }
    }
}

impl From<UncheckedInfo> for QueuedBlock {
    fn from(info: UncheckedInfo) -> Self {
        Self {
            block: Arc::new(info.block),
            account: info.account,
            modified: info.modified,
            verified: info.verified,
        }
    }
}

/// Queues and bookkeeping shared between producers and the worker.
struct Queues {
    /// Ready for the ledger.
    pending: VecDeque<QueuedBlock>,
    /// Waiting for batch signature verification.
    pending_state: VecDeque<QueuedBlock>,
    /// Must replace whatever occupies their root.
    forced: VecDeque<Arc<Block>>,
    /// Hashes in `pending` or `pending_state`.
    blocks_hashes: HashSet<BlockHash>,
    rolled_back: RolledBack,
    stopped: bool,
    /// A batch is being committed.
    active: bool,
    next_backlog_log: Instant,
}

impl Queues {
    fn has_blocks(&self) -> bool {
        !self.pending.is_empty() || !self.pending_state.is_empty() || !self.forced.is_empty()
    }

    fn size(&self) -> usize {
        self.pending.len() + self.pending_state.len() + self.forced.len()
    }
}

/// Queues blocks from any thread and commits them to the ledger on one worker.
pub struct BlockProcessor<S: Store + 'static> {
    thread: Arc<BlockProcessorThread<S>>,
    join_handle: Mutex<Option<JoinHandle<()>>>,
}

impl<S: Store + 'static> BlockProcessor<S> {
    pub fn new(
        config: BlockProcessorConfig,
        ledger: Arc<Ledger>,
        store: Arc<S>,
        checker: Arc<SignatureChecker>,
        work: WorkThresholds,
    ) -> Self {
        let verifier = StateBlockVerifier::new(checker, ledger.constants.epochs.clone());
        let queues = Queues {
            pending: VecDeque::new(),
            pending_state: VecDeque::new(),
            forced: VecDeque::new(),
            blocks_hashes: HashSet::new(),
            rolled_back: RolledBack::new(config.rolled_back_max),
            stopped: false,
            active: false,
            next_backlog_log: Instant::now(),
        };
        Self {
            thread: Arc::new(BlockProcessorThread {
                config,
                ledger,
                store,
                work,
                verifier,
                uniquer: BlockUniquer::new(),
                events: EventBus::new(),
                metrics: ProcessorMetrics::new(),
                mutex: Mutex::new(queues),
                condition: Condvar::new(),
            }),
            join_handle: Mutex::new(None),
        }
    }

    /// Build the signature checker from `config.signature_checker_threads`.
    pub fn from_config(
        config: BlockProcessorConfig,
        ledger: Arc<Ledger>,
        store: Arc<S>,
        work: WorkThresholds,
    ) -> Result<Self, NodeError> {
        let checker = Arc::new(SignatureChecker::new(config.signature_checker_threads)?);
        Ok(Self::new(config, ledger, store, checker, work))
    }

    /// Spawn the worker thread.
    pub fn start(&self) -> Result<(), NodeError> {
        let mut handle = self
            .join_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if handle.is_some() {
            return Err(NodeError::AlreadyStarted);
        }
        let thread = Arc::clone(&self.thread);
        *handle = Some(
            std::thread::Builder::new()
                .name("block processing".to_string())
                .spawn(move || thread.run())?,
        );
        Ok(())
    }

    /// Stop the worker and wake every waiter. Queued blocks are abandoned.
    pub fn stop(&self) {
        self.thread.stop();
        let handle = self
            .join_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("block processor thread panicked");
            }
        }
    }

    /// Queue a block that arrived just now.
    pub fn add(&self, block: Block) {
        self.add_with_origination(block, Timestamp::now());
    }

    /// Queue a block that first arrived at `origination`.
    pub fn add_with_origination(&self, block: Block, origination: Timestamp) {
        self.thread
            .add(QueuedBlock::new(Arc::new(block), origination));
    }

    /// Queue a block together with what is already known about it.
    pub fn add_unchecked(&self, info: UncheckedInfo) {
        let mut queued = QueuedBlock::from(info);
        if queued.modified.is_zero() {
            queued.modified = Timestamp::now();
        }
        self.thread.add(queued);
    }

    /// Queue a block that must replace whatever currently occupies its root.
    pub fn force(&self, block: Block) {
        self.thread.force(Arc::new(block));
    }

    /// Block until every queue is empty and no batch is running, or until
    /// the processor stops.
    pub fn flush(&self) {
        self.thread.flush();
    }

    /// Back-pressure signal for producers.
    pub fn full(&self) -> bool {
        self.size() >= self.thread.config.max_size()
    }

    pub fn half_full(&self) -> bool {
        self.size() >= self.thread.config.max_size() / 2
    }

    /// Blocks waiting in all queues.
    pub fn size(&self) -> usize {
        self.thread.lock().size()
    }

    /// Commit one block immediately in its own write transaction, bypassing
    /// the queues. Waits for the worker's transaction if one is open.
    pub fn process_one_now(&self, block: Block) -> Result<ProcessReturn, NodeError> {
        let item = QueuedBlock::new(Arc::new(block), Timestamp::now());
        let mut events = Vec::new();
        let mut txn = self.thread.store.tx_begin_write()?;
        let result = self.thread.process_one(&mut txn, &item, &mut events)?;
        txn.commit()?;
        self.thread.emit(&events);
        Ok(result)
    }

    pub fn events(&self) -> &EventBus {
        &self.thread.events
    }

    pub fn metrics(&self) -> &ProcessorMetrics {
        &self.thread.metrics
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.thread.ledger
    }

    pub fn uniquer(&self) -> &BlockUniquer {
        &self.thread.uniquer
    }
}

impl<S: Store + 'static> Drop for BlockProcessor<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

struct BlockProcessorThread<S> {
    config: BlockProcessorConfig,
    ledger: Arc<Ledger>,
    store: Arc<S>,
    work: WorkThresholds,
    verifier: StateBlockVerifier,
    uniquer: BlockUniquer,
    events: EventBus,
    metrics: ProcessorMetrics,
    mutex: Mutex<Queues>,
    condition: Condvar,
}

impl<S: Store> BlockProcessorThread<S> {
    fn lock(&self) -> MutexGuard<'_, Queues> {
        self.mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stop(&self) {
        self.lock().stopped = true;
        self.condition.notify_all();
    }

    fn add(&self, mut item: QueuedBlock) {
        let hash = item.block.hash();
        if !self.work.is_valid(&item.block) {
            // Producers validate work before queueing; reaching this is a bug upstream.
            tracing::warn!(%hash, "block queued with insufficient work");
            debug_assert!(false, "block {hash} queued with insufficient work");
            return;
        }
        item.block = self.uniquer.unique(item.block);

        {
            let mut queues = self.lock();
            if queues.blocks_hashes.contains(&hash) || queues.rolled_back.contains(&hash) {
                self.metrics.duplicates.inc();
                return;
            }
            let block_type = item.block.block_type();
            let needs_verification = item.verified == SignatureVerification::Unknown
                && (matches!(block_type, BlockType::State | BlockType::Open)
                    || !item.account.is_zero());
            if needs_verification {
                queues.pending_state.push_back(item);
            } else {
                queues.pending.push_back(item);
            }
            queues.blocks_hashes.insert(hash);
        }
        self.condition.notify_all();
    }

    fn force(&self, block: Arc<Block>) {
        self.lock().forced.push_back(block);
        self.condition.notify_all();
    }

    fn flush(&self) {
        let queues = self.lock();
        let _guard = self
            .condition
            .wait_while(queues, |q| !q.stopped && (q.has_blocks() || q.active))
            .unwrap_or_else(PoisonError::into_inner);
    }

    fn run(&self) {
        let mut queues = self.lock();
        while !queues.stopped {
            if queues.has_blocks() {
                queues.active = true;
                drop(queues);
                if let Err(err) = self.process_batch() {
                    tracing::error!(%err, "block processor batch failed");
                }
                queues = self.lock();
                queues.active = false;
            } else {
                self.condition.notify_all();
                queues = self
                    .condition
                    .wait(queues)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        }
        drop(queues);
        self.condition.notify_all();
    }

    fn process_batch(&self) -> Result<(), NodeError> {
        let start = Instant::now();
        let max_verification = self.config.max_verification_batch();

        // Verification only needs a snapshot; the writer is not taken yet.
        let queues = self.lock();
        let queues = {
            let snapshot = self.store.tx_begin_read()?;
            self.verify_state_blocks(&snapshot, queues, max_verification)
        };
        self.log_backlog(queues);

        let mut txn = self.store.tx_begin_write()?;
        let mut events = Vec::new();
        let mut processed = 0usize;
        let mut forced_count = 0usize;
        let mut queues = self.lock();
        while !queues.stopped
            && (!queues.pending.is_empty()
                || !queues.forced.is_empty()
                || !queues.pending_state.is_empty())
            && (processed == 0
                || start.elapsed() < self.config.batch_max_time()
                || processed < self.config.batch_size)
        {
            let verify_now = !queues.pending_state.is_empty()
                && (queues.pending.is_empty()
                    || (processed > 0 && processed % VERIFY_INTERVAL == 0));
            if verify_now {
                queues = self.verify_state_blocks(&txn, queues, max_verification);
                continue;
            }

            let (item, forced) = if let Some(block) = queues.forced.pop_front() {
                (QueuedBlock::new(block, Timestamp::now()), true)
            } else if let Some(item) = queues.pending.pop_front() {
                queues.blocks_hashes.remove(&item.block.hash());
                (item, false)
            } else {
                break;
            };
            drop(queues);

            // A failing block is skipped; the rest of the batch still commits.
            let hash = item.block.hash();
            if forced {
                forced_count += 1;
                if let Err(err) = self.roll_back_competitor(&mut txn, &item.block, &mut events) {
                    tracing::error!(%hash, %err, "failed to roll back competing chain");
                    self.metrics.failures.inc();
                }
            }
            if let Err(err) = self.process_one(&mut txn, &item, &mut events) {
                tracing::error!(%hash, %err, "failed to process block");
                self.metrics.failures.inc();
            }
            processed += 1;
            queues = self.lock();
        }
        self.metrics.set_queue_depths(
            queues.pending.len(),
            queues.pending_state.len(),
            queues.forced.len(),
        );
        drop(queues);

        txn.commit()?;
        self.emit(&events);

        let elapsed = start.elapsed();
        self.metrics
            .batch_time_ms
            .observe(elapsed.as_secs_f64() * 1_000.0);
        if elapsed > SLOW_BATCH {
            tracing::info!(
                blocks = processed,
                forced = forced_count,
                elapsed_ms = elapsed.as_millis() as u64,
                "processed block batch"
            );
        }
        Ok(())
    }

    /// Verify up to `max` queued state blocks with the lock released and move
    /// the survivors to `pending`.
    fn verify_state_blocks<'q, T: ReadTxn>(
        &'q self,
        txn: &T,
        mut queues: MutexGuard<'q, Queues>,
        max: usize,
    ) -> MutexGuard<'q, Queues> {
        let count = queues.pending_state.len().min(max.max(1));
        if count == 0 {
            return queues;
        }
        let drained: Vec<QueuedBlock> = queues.pending_state.drain(..count).collect();
        drop(queues);

        let mut items = Vec::with_capacity(drained.len());
        let mut committed = Vec::new();
        for item in drained {
            let hash = item.block.hash();
            match self.ledger.block_exists(txn, &hash) {
                Ok(true) => committed.push(hash),
                Ok(false) => items.push(item),
                Err(err) => {
                    // The ledger sees it again after verification.
                    tracing::warn!(%hash, %err, "could not look up queued block");
                    items.push(item);
                }
            }
        }
        let verdicts = self.verifier.verify(&items);
        self.metrics
            .verification_batch_size
            .observe(items.len() as f64);

        let mut queues = self.lock();
        for hash in committed {
            queues.blocks_hashes.remove(&hash);
        }
        for (mut item, verified) in items.into_iter().zip(verdicts) {
            if verified == SignatureVerification::Invalid {
                let hash = item.block.hash();
                tracing::debug!(%hash, "dropping state block with bad signature");
                self.metrics.bad_signatures.inc();
                queues.blocks_hashes.remove(&hash);
                continue;
            }
            item.verified = verified;
            queues.pending.push_back(item);
        }
        queues
    }

    /// Roll back the block occupying `block`'s root if it is a different block.
    fn roll_back_competitor<T: WriteTxn>(
        &self,
        txn: &mut T,
        block: &Arc<Block>,
        events: &mut Vec<ProcessorEvent>,
    ) -> Result<(), NodeError> {
        let hash = block.hash();
        let Some(successor) = self.ledger.successor(&*txn, &block.qualified_root())? else {
            return Ok(());
        };
        if successor == hash {
            return Ok(());
        }
        let mut undone = Vec::new();
        self.ledger.rollback(txn, &successor, &mut undone)?;
        tracing::info!(
            winner = %hash,
            loser = %successor,
            blocks = undone.len(),
            "rolled back competing chain"
        );
        self.metrics.rollbacks.inc();
        self.metrics.rolled_back_blocks.inc_by(undone.len() as u64);
        self.lock().rolled_back.insert(successor);
        events.push(ProcessorEvent::RolledBack {
            winner: hash,
            undone,
        });
        Ok(())
    }

    /// Offer one block to the ledger and act on the verdict.
    fn process_one<T: WriteTxn>(
        &self,
        txn: &mut T,
        item: &QueuedBlock,
        events: &mut Vec<ProcessorEvent>,
    ) -> Result<ProcessReturn, NodeError> {
        let block = &item.block;
        let hash = block.hash();
        let result = self.ledger.process(txn, block, item.verified)?;
        self.metrics.record_result(result.code);
        let now = Timestamp::now();

        match result.code {
            ProcessResult::Progress => {
                tracing::debug!(%hash, account = %result.account, "processed block");
                if item.modified.is_within(self.config.live_window_secs, now) {
                    events.push(ProcessorEvent::Live {
                        block: Arc::clone(block),
                        result: result.code,
                    });
                }
                self.queue_unchecked(txn, &hash, events)?;
            }
            ProcessResult::GapPrevious => {
                tracing::debug!(%hash, previous = %block.previous(), "gap previous");
                self.park(txn, item, block.previous(), result.verified, events)?;
            }
            ProcessResult::GapSource => {
                let source = if block.source().is_zero() {
                    block.link().as_block_hash()
                } else {
                    block.source()
                };
                tracing::debug!(%hash, %source, "gap source");
                self.park(txn, item, source, result.verified, events)?;
            }
            ProcessResult::Old => {
                tracing::debug!(%hash, "old block");
                if !self.config.fast_bootstrap {
                    self.queue_unchecked(txn, &hash, events)?;
                }
            }
            ProcessResult::Fork => {
                tracing::debug!(%hash, root = %block.root(), "fork");
                if !item.modified.is_within(self.config.fork_grace_secs, now) {
                    events.push(ProcessorEvent::Fork {
                        block: Arc::clone(block),
                    });
                }
            }
            code => {
                tracing::debug!(%hash, result = %code, "rejected block");
                events.push(ProcessorEvent::Rejected { hash, result: code });
            }
        }
        Ok(result)
    }

    /// Store `item` in the unchecked table until `dependency` commits.
    fn park<T: WriteTxn>(
        &self,
        txn: &mut T,
        item: &QueuedBlock,
        dependency: BlockHash,
        verified: SignatureVerification,
        events: &mut Vec<ProcessorEvent>,
    ) -> Result<(), NodeError> {
        let hash = item.block.hash();
        txn.put_unchecked(
            &UncheckedKey::new(dependency, hash),
            &item.to_unchecked(verified),
        )?;
        self.metrics.unchecked_added.inc();
        events.push(ProcessorEvent::Gap { hash, dependency });
        Ok(())
    }

    /// Re-queue every block that was waiting on `hash`.
    fn queue_unchecked<T: WriteTxn>(
        &self,
        txn: &mut T,
        hash: &BlockHash,
        events: &mut Vec<ProcessorEvent>,
    ) -> Result<(), NodeError> {
        let waiting = txn.get_unchecked(hash)?;
        if waiting.is_empty() {
            return Ok(());
        }
        let count = waiting.len();
        for (key, info) in waiting {
            if self.config.unchecked_deletion {
                txn.delete_unchecked(&key)?;
            }
            self.add(QueuedBlock::from(info));
        }
        tracing::debug!(dependency = %hash, count, "re-queued unchecked blocks");
        self.metrics.unchecked_retried.inc_by(count as u64);
        events.push(ProcessorEvent::GapResolved { dependency: *hash });
        Ok(())
    }

    fn log_backlog(&self, mut queues: MutexGuard<'_, Queues>) {
        let size = queues.size();
        if size > BACKLOG_LOG_THRESHOLD && Instant::now() >= queues.next_backlog_log {
            queues.next_backlog_log = Instant::now() + BACKLOG_LOG_INTERVAL;
            tracing::info!(
                pending = queues.pending.len(),
                pending_state = queues.pending_state.len(),
                forced = queues.forced.len(),
                "blocks in processing queue"
            );
        }
    }

    fn emit(&self, events: &[ProcessorEvent]) {
        for event in events {
            self.events.emit(event);
        }
    }
}
