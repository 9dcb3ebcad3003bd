//! Block processor tests: queues, batch verification, gap resolution, forced
//! fork replacement and shutdown.
//!
//! Most tests run the processor against the in-memory `NullStore` with the
//! work check disabled; the last section wires it to LMDB with real work.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use lattice_crypto::{keypair_from_seed, open_block, send_block, state_block, SignatureChecker};
use lattice_ledger::{Ledger, LedgerConstants, ProcessResult};
use lattice_node::{BlockProcessor, BlockProcessorConfig, ProcessorEvent};
use lattice_nullables::NullStore;
use lattice_store::{
    AccountStore, BlockStore, FrontierStoreMut, Store, UncheckedInfo, UncheckedStore, WriteTxn,
};
use lattice_types::{
    Amount, Block, BlockHash, Epoch, KeyPair, Link, SignatureVerification, Timestamp,
};
use lattice_work::{WorkGenerator, WorkThresholds};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Context {
    store: Arc<NullStore>,
    ledger: Arc<Ledger>,
    processor: BlockProcessor<NullStore>,
    events: Arc<Mutex<Vec<ProcessorEvent>>>,
    genesis: KeyPair,
}

impl Context {
    fn new(config: BlockProcessorConfig, work: WorkThresholds) -> Self {
        let store = Arc::new(NullStore::new());
        let ledger = Arc::new(Ledger::new(LedgerConstants::dev()));
        let mut txn = store.tx_begin_write().expect("write txn");
        ledger.initialize(&mut txn).expect("initialize");
        txn.commit().expect("commit");

        let checker = Arc::new(SignatureChecker::new(0).expect("checker"));
        let processor =
            BlockProcessor::new(config, Arc::clone(&ledger), Arc::clone(&store), checker, work);
        let events = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&events);
        processor.events().subscribe(Box::new(move |event| {
            recorder.lock().unwrap().push(event.clone());
        }));
        Self {
            store,
            ledger,
            processor,
            events,
            genesis: LedgerConstants::dev_genesis_keys(),
        }
    }

    /// Started processor, default config, no work check.
    fn started() -> Self {
        let ctx = Self::new(BlockProcessorConfig::default(), WorkThresholds::with_base(0));
        ctx.processor.start().expect("start");
        ctx
    }

    fn genesis_hash(&self) -> BlockHash {
        self.ledger.constants.genesis.hash()
    }

    fn exists(&self, hash: &BlockHash) -> bool {
        self.store.tx_begin_read().unwrap().block_exists(hash).unwrap()
    }

    fn balance(&self, keys: &KeyPair) -> Amount {
        self.store
            .tx_begin_read()
            .unwrap()
            .get_account(&keys.account)
            .unwrap()
            .map(|info| info.balance)
            .unwrap_or_default()
    }

    fn unchecked_count(&self) -> u64 {
        self.store.tx_begin_read().unwrap().unchecked_count().unwrap()
    }

    fn events(&self) -> Vec<ProcessorEvent> {
        self.events.lock().unwrap().clone()
    }
}

fn key(seed: u8) -> KeyPair {
    keypair_from_seed(&[seed; 32])
}

/// Genesis sends 1000 to `dest`, `dest` opens, sends 600 back, genesis
/// receives it and `dest` changes representative.
fn chain(genesis: &KeyPair, genesis_hash: BlockHash) -> Vec<Block> {
    let dest = key(1);
    let send1 = state_block(
        genesis.account,
        genesis_hash,
        genesis.account,
        Amount::MAX - Amount::raw(1_000),
        dest.account.as_link(),
        genesis,
        0,
    );
    let open = state_block(
        dest.account,
        BlockHash::ZERO,
        dest.account,
        Amount::raw(1_000),
        send1.hash().as_link(),
        &dest,
        0,
    );
    let send2 = state_block(
        dest.account,
        open.hash(),
        dest.account,
        Amount::raw(400),
        genesis.account.as_link(),
        &dest,
        0,
    );
    let receive = state_block(
        genesis.account,
        send1.hash(),
        genesis.account,
        Amount::MAX - Amount::raw(400),
        send2.hash().as_link(),
        genesis,
        0,
    );
    let change = state_block(
        dest.account,
        send2.hash(),
        key(2).account,
        Amount::raw(400),
        Link::ZERO,
        &dest,
        0,
    );
    vec![send1, open, send2, receive, change]
}

// ---------------------------------------------------------------------------
// 1. Queueing and commit
// ---------------------------------------------------------------------------

#[test]
fn added_blocks_are_committed_by_flush() {
    let ctx = Context::started();
    let dest = key(1);
    let legacy = send_block(
        ctx.genesis_hash(),
        dest.account,
        Amount::MAX - Amount::raw(10),
        &ctx.genesis,
        0,
    );
    let state = state_block(
        ctx.genesis.account,
        legacy.hash(),
        ctx.genesis.account,
        Amount::MAX - Amount::raw(30),
        dest.account.as_link(),
        &ctx.genesis,
        0,
    );
    ctx.processor.add(legacy.clone());
    ctx.processor.add(state.clone());
    ctx.processor.flush();

    assert!(ctx.exists(&legacy.hash()));
    assert!(ctx.exists(&state.hash()));
    assert_eq!(ctx.processor.size(), 0);
    assert_eq!(ctx.balance(&ctx.genesis), Amount::MAX - Amount::raw(30));
    let live = ctx
        .events()
        .iter()
        .filter(|e| matches!(e, ProcessorEvent::Live { result: ProcessResult::Progress, .. }))
        .count();
    assert_eq!(live, 2);
    assert_eq!(ctx.processor.metrics().result_count(ProcessResult::Progress), 2);
}

#[test]
fn old_blocks_are_not_live() {
    let ctx = Context::started();
    let block = send_block(
        ctx.genesis_hash(),
        key(1).account,
        Amount::raw(1),
        &ctx.genesis,
        0,
    );
    let arrived = Timestamp::new(Timestamp::now().as_secs() - 3_600);
    ctx.processor.add_with_origination(block.clone(), arrived);
    ctx.processor.flush();
    assert!(ctx.exists(&block.hash()));
    assert!(!ctx
        .events()
        .iter()
        .any(|e| matches!(e, ProcessorEvent::Live { .. })));
}

#[test]
fn duplicates_are_ignored_while_queued() {
    // Not started: blocks stay queued.
    let ctx = Context::new(BlockProcessorConfig::default(), WorkThresholds::with_base(0));
    let block = send_block(ctx.genesis_hash(), key(1).account, Amount::raw(1), &ctx.genesis, 0);
    ctx.processor.add(block.clone());
    ctx.processor.add(block);
    assert_eq!(ctx.processor.size(), 1);
    assert_eq!(ctx.processor.metrics().duplicates.get(), 1);
}

#[test]
fn full_and_half_full_follow_queue_depth() {
    let config = BlockProcessorConfig {
        full_size: 4,
        ..BlockProcessorConfig::default()
    };
    let ctx = Context::new(config, WorkThresholds::with_base(0));
    let blocks: Vec<Block> = (1u64..=4)
        .map(|i| send_block(BlockHash::from(i), key(1).account, Amount::raw(1), &ctx.genesis, 0))
        .collect();
    ctx.processor.add(blocks[0].clone());
    assert!(!ctx.processor.half_full());
    ctx.processor.add(blocks[1].clone());
    assert!(ctx.processor.half_full());
    assert!(!ctx.processor.full());
    ctx.processor.add(blocks[2].clone());
    ctx.processor.force(blocks[3].clone());
    assert!(ctx.processor.full());
}

#[test]
fn interned_blocks_share_allocations() {
    let ctx = Context::new(BlockProcessorConfig::default(), WorkThresholds::with_base(0));
    let block = send_block(ctx.genesis_hash(), key(1).account, Amount::raw(1), &ctx.genesis, 0);
    ctx.processor.add(block);
    assert_eq!(ctx.processor.uniquer().len(), 1);
}

// ---------------------------------------------------------------------------
// 2. Signatures
// ---------------------------------------------------------------------------

#[test]
fn state_block_with_bad_signature_is_dropped_before_the_ledger() {
    let ctx = Context::started();
    let forged = state_block(
        ctx.genesis.account,
        ctx.genesis_hash(),
        ctx.genesis.account,
        Amount::raw(0),
        key(1).account.as_link(),
        &key(1),
        0,
    );
    ctx.processor.add(forged.clone());
    ctx.processor.flush();
    assert!(!ctx.exists(&forged.hash()));
    assert_eq!(ctx.processor.metrics().bad_signatures.get(), 1);
    assert_eq!(ctx.processor.metrics().result_count(ProcessResult::BadSignature), 0);
}

#[test]
fn legacy_block_with_bad_signature_is_rejected_by_the_ledger() {
    let ctx = Context::started();
    let forged = send_block(ctx.genesis_hash(), key(1).account, Amount::ZERO, &key(1), 0);
    ctx.processor.add(forged.clone());
    ctx.processor.flush();
    assert!(!ctx.exists(&forged.hash()));
    assert!(ctx.events().iter().any(|e| matches!(
        e,
        ProcessorEvent::Rejected { hash, result: ProcessResult::BadSignature } if *hash == forged.hash()
    )));
}

#[test]
fn send_to_epoch_link_account_is_verified_by_the_ledger() {
    let ctx = Context::started();
    let link = ctx.ledger.epoch_link(Epoch::Epoch1).unwrap();
    let send = state_block(
        ctx.genesis.account,
        ctx.genesis_hash(),
        ctx.genesis.account,
        Amount::MAX - Amount::raw(5),
        link,
        &ctx.genesis,
        0,
    );
    ctx.processor.add(send.clone());
    ctx.processor.flush();
    assert!(ctx.exists(&send.hash()));
}

#[test]
fn epoch_block_is_verified_against_the_epoch_signer() {
    let ctx = Context::started();
    let epoch = state_block(
        ctx.genesis.account,
        ctx.genesis_hash(),
        ctx.genesis.account,
        Amount::MAX,
        ctx.ledger.epoch_link(Epoch::Epoch1).unwrap(),
        &ctx.genesis,
        0,
    );
    ctx.processor.add(epoch.clone());
    ctx.processor.flush();
    let info = ctx
        .store
        .tx_begin_read()
        .unwrap()
        .get_account(&ctx.genesis.account)
        .unwrap()
        .unwrap();
    assert_eq!(info.head, epoch.hash());
    assert_eq!(info.epoch, Epoch::Epoch1);
}

#[test]
fn vouched_signature_skips_verification() {
    let ctx = Context::started();
    let forged = send_block(ctx.genesis_hash(), key(1).account, Amount::ZERO, &key(1), 0);
    let mut info = UncheckedInfo::new(forged.clone(), Timestamp::now());
    info.verified = SignatureVerification::Valid;
    ctx.processor.add_unchecked(info);
    ctx.processor.flush();
    assert!(ctx.exists(&forged.hash()));
}

// ---------------------------------------------------------------------------
// 3. Gaps and unchecked retry
// ---------------------------------------------------------------------------

#[test]
fn blocks_in_reverse_order_are_resolved() {
    let ctx = Context::started();
    let blocks = chain(&ctx.genesis, ctx.genesis_hash());
    for block in blocks.iter().rev() {
        ctx.processor.add(block.clone());
    }
    ctx.processor.flush();

    for block in &blocks {
        assert!(ctx.exists(&block.hash()), "missing {}", block.hash());
    }
    assert_eq!(ctx.unchecked_count(), 0);
    assert_eq!(ctx.balance(&key(1)), Amount::raw(400));
    let events = ctx.events();
    assert!(events.iter().any(|e| matches!(e, ProcessorEvent::Gap { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, ProcessorEvent::GapResolved { .. })));
}

#[test]
fn gap_is_parked_under_its_dependency() {
    let ctx = Context::started();
    let blocks = chain(&ctx.genesis, ctx.genesis_hash());
    let open = &blocks[1];
    ctx.processor.add(open.clone());
    ctx.processor.flush();

    let txn = ctx.store.tx_begin_read().unwrap();
    let parked = txn.get_unchecked(&blocks[0].hash()).unwrap();
    assert_eq!(parked.len(), 1);
    assert_eq!(parked[0].0.hash, open.hash());
    assert_eq!(parked[0].1.verified, SignatureVerification::Valid);
    drop(txn);
    assert!(ctx.events().iter().any(|e| matches!(
        e,
        ProcessorEvent::Gap { hash, dependency } if *hash == open.hash() && *dependency == blocks[0].hash()
    )));
}

#[test]
fn synchronous_commit_retries_waiting_blocks() {
    let ctx = Context::started();
    let blocks = chain(&ctx.genesis, ctx.genesis_hash());
    ctx.processor.add(blocks[1].clone());
    ctx.processor.flush();
    assert_eq!(ctx.unchecked_count(), 1);

    let result = ctx.processor.process_one_now(blocks[0].clone()).unwrap();
    assert_eq!(result.code, ProcessResult::Progress);
    ctx.processor.flush();
    assert!(ctx.exists(&blocks[1].hash()));
    assert_eq!(ctx.unchecked_count(), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Any arrival order converges on the same ledger.
    #[test]
    fn arrival_order_does_not_matter(order in Just((0..5).collect::<Vec<usize>>()).prop_shuffle()) {
        let ctx = Context::started();
        let blocks = chain(&ctx.genesis, ctx.genesis_hash());
        for &i in &order {
            ctx.processor.add(blocks[i].clone());
        }
        ctx.processor.flush();

        for block in &blocks {
            prop_assert!(ctx.exists(&block.hash()));
        }
        prop_assert_eq!(ctx.unchecked_count(), 0);
        prop_assert_eq!(ctx.balance(&ctx.genesis), Amount::MAX - Amount::raw(400));
        prop_assert_eq!(ctx.balance(&key(1)), Amount::raw(400));
        let txn = ctx.store.tx_begin_read().unwrap();
        prop_assert_eq!(
            ctx.ledger.weight(&txn, &key(2).account).unwrap(),
            Amount::raw(400)
        );
    }
}

// ---------------------------------------------------------------------------
// 4. Forks
// ---------------------------------------------------------------------------

#[test]
fn forced_block_replaces_competing_chain() {
    let ctx = Context::started();
    let loser_dest = key(1);
    let loser = state_block(
        ctx.genesis.account,
        ctx.genesis_hash(),
        ctx.genesis.account,
        Amount::MAX - Amount::raw(100),
        loser_dest.account.as_link(),
        &ctx.genesis,
        0,
    );
    let dependent = state_block(
        loser_dest.account,
        BlockHash::ZERO,
        loser_dest.account,
        Amount::raw(100),
        loser.hash().as_link(),
        &loser_dest,
        0,
    );
    ctx.processor.add(loser.clone());
    ctx.processor.add(dependent.clone());
    ctx.processor.flush();
    assert!(ctx.exists(&dependent.hash()));

    let winner = state_block(
        ctx.genesis.account,
        ctx.genesis_hash(),
        ctx.genesis.account,
        Amount::MAX - Amount::raw(7),
        key(3).account.as_link(),
        &ctx.genesis,
        0,
    );
    ctx.processor.force(winner.clone());
    ctx.processor.flush();

    assert!(ctx.exists(&winner.hash()));
    assert!(!ctx.exists(&loser.hash()));
    assert!(!ctx.exists(&dependent.hash()));
    assert_eq!(ctx.balance(&loser_dest), Amount::ZERO);
    assert!(ctx.events().iter().any(|e| matches!(
        e,
        ProcessorEvent::RolledBack { winner: w, undone }
            if *w == winner.hash() && undone == &vec![dependent.hash(), loser.hash()]
    )));
    assert_eq!(ctx.processor.metrics().rollbacks.get(), 1);

    // The loser echoing back from the network is ignored.
    ctx.processor.add(loser.clone());
    assert_eq!(ctx.processor.size(), 0);
    assert_eq!(ctx.processor.metrics().duplicates.get(), 1);
}

#[test]
fn forcing_the_current_head_rolls_back_nothing() {
    let ctx = Context::started();
    let block = send_block(ctx.genesis_hash(), key(1).account, Amount::raw(1), &ctx.genesis, 0);
    ctx.processor.add(block.clone());
    ctx.processor.flush();
    ctx.processor.force(block.clone());
    ctx.processor.flush();
    assert!(ctx.exists(&block.hash()));
    assert_eq!(ctx.processor.metrics().rollbacks.get(), 0);
    assert_eq!(ctx.processor.metrics().result_count(ProcessResult::Old), 1);
}

#[test]
fn only_stale_forks_are_reported() {
    let ctx = Context::started();
    let first = send_block(ctx.genesis_hash(), key(1).account, Amount::raw(1), &ctx.genesis, 0);
    let recent = send_block(ctx.genesis_hash(), key(2).account, Amount::raw(2), &ctx.genesis, 0);
    let stale = send_block(ctx.genesis_hash(), key(3).account, Amount::raw(3), &ctx.genesis, 0);
    ctx.processor.add(first);
    ctx.processor.flush();
    ctx.processor.add(recent.clone());
    ctx.processor
        .add_with_origination(stale.clone(), Timestamp::new(Timestamp::now().as_secs() - 60));
    ctx.processor.flush();

    assert_eq!(ctx.processor.metrics().result_count(ProcessResult::Fork), 2);
    let forks: Vec<BlockHash> = ctx
        .events()
        .iter()
        .filter_map(|e| match e {
            ProcessorEvent::Fork { block } => Some(block.hash()),
            _ => None,
        })
        .collect();
    assert_eq!(forks, vec![stale.hash()]);
}

// ---------------------------------------------------------------------------
// 5. Work and shutdown
// ---------------------------------------------------------------------------

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "insufficient work")]
fn insufficient_work_is_a_caller_bug() {
    let ctx = Context::new(BlockProcessorConfig::default(), WorkThresholds::with_base(u64::MAX));
    let block = send_block(ctx.genesis_hash(), key(1).account, Amount::raw(1), &ctx.genesis, 0);
    ctx.processor.add(block);
}

#[test]
#[cfg(not(debug_assertions))]
fn insufficient_work_is_never_queued() {
    let ctx = Context::new(BlockProcessorConfig::default(), WorkThresholds::with_base(u64::MAX));
    let block = send_block(ctx.genesis_hash(), key(1).account, Amount::raw(1), &ctx.genesis, 0);
    ctx.processor.add(block);
    assert_eq!(ctx.processor.size(), 0);
}

#[test]
fn flush_returns_once_stopped() {
    let ctx = Context::new(BlockProcessorConfig::default(), WorkThresholds::with_base(0));
    let block = send_block(ctx.genesis_hash(), key(1).account, Amount::raw(1), &ctx.genesis, 0);
    ctx.processor.add(block);
    ctx.processor.stop();
    ctx.processor.flush();
    assert_eq!(ctx.processor.size(), 1);
}

#[test]
fn starting_twice_fails() {
    let ctx = Context::started();
    assert!(matches!(
        ctx.processor.start(),
        Err(lattice_node::NodeError::AlreadyStarted)
    ));
    ctx.processor.stop();
}

// ---------------------------------------------------------------------------
// 6. Batching and failures
// ---------------------------------------------------------------------------

/// Ten legacy sends chained onto genesis.
fn send_chain(ctx: &Context) -> Vec<Block> {
    let mut previous = ctx.genesis_hash();
    (1..=10u128)
        .map(|i| {
            let send = send_block(
                previous,
                key(1).account,
                Amount::MAX - Amount::raw(i),
                &ctx.genesis,
                0,
            );
            previous = send.hash();
            send
        })
        .collect()
}

fn batches_for_backlog(config: BlockProcessorConfig) -> u64 {
    let ctx = Context::new(config, WorkThresholds::with_base(0));
    let blocks = send_chain(&ctx);
    for block in &blocks {
        ctx.processor.add(block.clone());
    }
    ctx.processor.start().expect("start");
    ctx.processor.flush();
    for block in &blocks {
        assert!(ctx.exists(&block.hash()));
    }
    ctx.processor.metrics().batch_time_ms.get_sample_count()
}

#[test]
fn exhausted_budget_splits_backlog_into_batches() {
    let config = BlockProcessorConfig {
        batch_max_time_ms: 0,
        ..BlockProcessorConfig::default()
    };
    // Every batch commits at least one block, then the budget is spent.
    assert_eq!(batches_for_backlog(config), 10);
}

#[test]
fn fast_bootstrap_budget_can_be_unbounded() {
    let config = BlockProcessorConfig {
        batch_max_time_ms: 0,
        bootstrap_batch_max_time_ms: 0,
        fast_bootstrap: true,
        ..BlockProcessorConfig::default()
    };
    assert_eq!(batches_for_backlog(config), 1);
}

#[test]
fn ledger_failure_skips_block_and_keeps_batch() {
    let ctx = Context::new(BlockProcessorConfig::default(), WorkThresholds::with_base(0));
    let dest = key(1);
    let rogue = key(9);
    let send = send_block(
        ctx.genesis_hash(),
        dest.account,
        Amount::MAX - Amount::raw(50),
        &ctx.genesis,
        0,
    );
    let open = open_block(send.hash(), dest.account, &dest, 0);
    let mut txn = ctx.store.tx_begin_write().unwrap();
    for block in [&send, &open] {
        let result = ctx
            .ledger
            .process(&mut txn, block, SignatureVerification::Unknown)
            .unwrap();
        assert_eq!(result.code, ProcessResult::Progress);
    }
    // Point the frontier at an account with no record.
    txn.put_frontier(&open.hash(), &rogue.account).unwrap();
    txn.commit().unwrap();

    let good = state_block(
        ctx.genesis.account,
        send.hash(),
        ctx.genesis.account,
        Amount::MAX - Amount::raw(80),
        dest.account.as_link(),
        &ctx.genesis,
        0,
    );
    let broken = send_block(open.hash(), ctx.genesis.account, Amount::ZERO, &rogue, 0);
    let mut vouched = UncheckedInfo::new(good.clone(), Timestamp::now());
    vouched.verified = SignatureVerification::Valid;
    ctx.processor.add_unchecked(vouched);
    ctx.processor.add(broken.clone());
    ctx.processor.start().expect("start");
    ctx.processor.flush();

    assert!(ctx.exists(&good.hash()));
    assert!(!ctx.exists(&broken.hash()));
    assert_eq!(ctx.processor.metrics().failures.get(), 1);

    // The worker keeps going.
    let next = state_block(
        ctx.genesis.account,
        good.hash(),
        ctx.genesis.account,
        Amount::MAX - Amount::raw(90),
        dest.account.as_link(),
        &ctx.genesis,
        0,
    );
    ctx.processor.add(next.clone());
    ctx.processor.flush();
    assert!(ctx.exists(&next.hash()));
}

// ---------------------------------------------------------------------------
// 7. LMDB with real work
// ---------------------------------------------------------------------------

#[test]
fn lmdb_store_with_generated_work() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = lattice_store_lmdb::LmdbConfig {
        map_size: 64 * 1024 * 1024,
    };
    let store = Arc::new(
        lattice_store_lmdb::LmdbStore::open(dir.path(), &config).expect("open store"),
    );
    let ledger = Arc::new(Ledger::new(LedgerConstants::dev()));
    let mut txn = store.tx_begin_write().unwrap();
    ledger.initialize(&mut txn).unwrap();
    txn.commit().unwrap();

    let thresholds = WorkThresholds::dev();
    let processor = BlockProcessor::from_config(
        BlockProcessorConfig::default(),
        Arc::clone(&ledger),
        Arc::clone(&store),
        thresholds,
    )
    .expect("processor");
    processor.start().expect("start");

    let genesis = LedgerConstants::dev_genesis_keys();
    let dest = key(1);
    let generator = WorkGenerator::new();
    let genesis_hash = ledger.constants.genesis.hash();
    let send_work = generator
        .generate(&genesis_hash.as_root(), thresholds.publish)
        .expect("work");
    let send = state_block(
        genesis.account,
        genesis_hash,
        genesis.account,
        Amount::MAX - Amount::raw(55),
        dest.account.as_link(),
        &genesis,
        send_work,
    );
    let open_work = generator
        .generate(&dest.account.into(), thresholds.publish)
        .expect("work");
    let open = state_block(
        dest.account,
        BlockHash::ZERO,
        dest.account,
        Amount::raw(55),
        send.hash().as_link(),
        &dest,
        open_work,
    );
    processor.add(open.clone());
    processor.add(send.clone());
    processor.flush();
    processor.stop();

    let txn = store.tx_begin_read().unwrap();
    assert!(txn.block_exists(&open.hash()).unwrap());
    assert_eq!(
        ledger.account_balance(&txn, &dest.account).unwrap(),
        Amount::raw(55)
    );
    assert_eq!(txn.unchecked_count().unwrap(), 0);
}
