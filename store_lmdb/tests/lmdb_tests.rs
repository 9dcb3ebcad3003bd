use lattice_store::{
    AccountInfo, AccountStore, AccountStoreMut, BlockDetails, BlockSideband, BlockStore,
    BlockStoreMut, FrontierStore, FrontierStoreMut, MetaStore, PendingInfo, PendingKey,
    PendingStore, PendingStoreMut, RepWeightStore, RepWeightStoreMut, Store, UncheckedInfo,
    UncheckedKey, UncheckedStore, UncheckedStoreMut, WriteTxn, STORE_VERSION,
};
use lattice_store_lmdb::{LmdbConfig, LmdbStore};
use lattice_types::{
    Account, Amount, Block, BlockHash, Epoch, Link, Signature, StateBlock, StateHashables,
    Timestamp,
};

fn small_config() -> LmdbConfig {
    LmdbConfig {
        map_size: 64 * 1024 * 1024,
    }
}

fn open(dir: &tempfile::TempDir) -> LmdbStore {
    LmdbStore::open(dir.path(), &small_config()).unwrap()
}

fn state_block(seed: u8) -> Block {
    Block::State(StateBlock::new(
        StateHashables {
            account: Account::new([seed; 32]),
            previous: BlockHash::ZERO,
            representative: Account::new([2; 32]),
            balance: Amount::raw(100),
            link: Link::new([3; 32]),
        },
        Signature([4; 64]),
        7,
    ))
}

fn sideband(account: Account) -> BlockSideband {
    BlockSideband {
        account,
        height: 1,
        balance: Amount::raw(100),
        timestamp: Timestamp::new(1_700_000_000),
        details: BlockDetails::default(),
        source_epoch: Epoch::Epoch0,
    }
}

#[test]
fn fresh_store_is_stamped_with_version() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    let txn = store.tx_begin_read().unwrap();
    assert_eq!(txn.get_version().unwrap(), Some(STORE_VERSION));
}

#[test]
fn block_and_successor_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let block = state_block(1);
    let hash = block.hash();
    {
        let store = open(&dir);
        let mut txn = store.tx_begin_write().unwrap();
        txn.put_block(&block, &sideband(Account::new([1; 32]))).unwrap();
        txn.put_successor(&hash, &BlockHash::from(42)).unwrap();
        txn.commit().unwrap();
    }

    let store = open(&dir);
    let txn = store.tx_begin_read().unwrap();
    let stored = txn.get_block(&hash).unwrap().unwrap();
    assert_eq!(stored.block, block);
    assert_eq!(stored.sideband, sideband(Account::new([1; 32])));
    assert_eq!(txn.get_successor(&hash).unwrap(), Some(BlockHash::from(42)));
    assert_eq!(txn.block_count().unwrap(), 1);
}

#[test]
fn uncommitted_write_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    {
        let mut txn = store.tx_begin_write().unwrap();
        txn.put_account(&Account::from(1), &AccountInfo::default())
            .unwrap();
    }
    let txn = store.tx_begin_read().unwrap();
    assert!(!txn.account_exists(&Account::from(1)).unwrap());
}

#[test]
fn accounts_and_frontiers() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    let info = AccountInfo {
        head: BlockHash::from(5),
        representative_block: BlockHash::from(4),
        open_block: BlockHash::from(4),
        balance: Amount::raw(9),
        modified: Timestamp::new(3),
        block_count: 2,
        epoch: Epoch::Epoch1,
    };

    let mut txn = store.tx_begin_write().unwrap();
    txn.put_account(&Account::from(1), &info).unwrap();
    txn.put_frontier(&BlockHash::from(5), &Account::from(1)).unwrap();
    txn.commit().unwrap();

    let txn = store.tx_begin_read().unwrap();
    assert_eq!(txn.get_account(&Account::from(1)).unwrap(), Some(info));
    assert_eq!(txn.accounts().unwrap().len(), 1);
    assert_eq!(
        txn.get_frontier(&BlockHash::from(5)).unwrap(),
        Some(Account::from(1))
    );
    drop(txn);

    let mut txn = store.tx_begin_write().unwrap();
    txn.delete_frontier(&BlockHash::from(5)).unwrap();
    txn.delete_account(&Account::from(1)).unwrap();
    txn.commit().unwrap();

    let txn = store.tx_begin_read().unwrap();
    assert_eq!(txn.account_count().unwrap(), 0);
    assert_eq!(txn.frontier_count().unwrap(), 0);
}

#[test]
fn pending_scan_stops_at_account_boundary() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    let info = PendingInfo {
        source: Account::from(9),
        amount: Amount::raw(1),
        epoch: Epoch::Epoch0,
    };

    let mut txn = store.tx_begin_write().unwrap();
    for (account, hash) in [(1u64, 5u64), (2, 1), (2, 2), (3, 0)] {
        let key = PendingKey::new(Account::from(account), BlockHash::from(hash));
        txn.put_pending(&key, &info).unwrap();
    }
    txn.commit().unwrap();

    let txn = store.tx_begin_read().unwrap();
    let two = txn.pending_for_account(&Account::from(2)).unwrap();
    assert_eq!(two.len(), 2);
    assert!(two.iter().all(|(key, _)| key.account == Account::from(2)));
    assert!(!txn.any_pending(&Account::from(4)).unwrap());
    assert_eq!(txn.pending_count().unwrap(), 4);
}

#[test]
fn weights_default_to_zero_and_zero_removes() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    let rep = Account::from(3);

    let mut txn = store.tx_begin_write().unwrap();
    assert_eq!(txn.get_weight(&rep).unwrap(), Amount::ZERO);
    txn.put_weight(&rep, Amount::raw(1 << 100)).unwrap();
    assert_eq!(txn.get_weight(&rep).unwrap(), Amount::raw(1 << 100));
    txn.put_weight(&rep, Amount::ZERO).unwrap();
    assert!(txn.rep_weights().unwrap().is_empty());
}

#[test]
fn unchecked_grouped_by_dependency() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    let dependency = BlockHash::from(77);

    let mut txn = store.tx_begin_write().unwrap();
    for seed in [1u8, 2] {
        let block = state_block(seed);
        let key = UncheckedKey::new(dependency, block.hash());
        txn.put_unchecked(&key, &UncheckedInfo::new(block, Timestamp::new(1)))
            .unwrap();
    }
    let other = state_block(3);
    let other_key = UncheckedKey::new(BlockHash::from(78), other.hash());
    txn.put_unchecked(&other_key, &UncheckedInfo::new(other, Timestamp::new(1)))
        .unwrap();
    txn.commit().unwrap();

    let txn = store.tx_begin_read().unwrap();
    let waiting = txn.get_unchecked(&dependency).unwrap();
    assert_eq!(waiting.len(), 2);
    assert!(waiting.iter().all(|(key, _)| key.dependency == dependency));
    assert!(txn.unchecked_exists(&other_key).unwrap());
    assert_eq!(txn.unchecked_count().unwrap(), 3);
    drop(txn);

    let mut txn = store.tx_begin_write().unwrap();
    txn.delete_unchecked(&other_key).unwrap();
    txn.commit().unwrap();
    assert_eq!(store.tx_begin_read().unwrap().unchecked_count().unwrap(), 2);
}
