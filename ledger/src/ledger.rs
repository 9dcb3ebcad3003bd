//! The ledger: chain validation, commit, rollback and read-only queries.
//!
//! `Ledger` holds no table state of its own. Every operation runs against a
//! transaction supplied by the caller, so a batch of `process` calls shares one
//! write transaction and commits atomically.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use lattice_store::{
    AccountInfo, BlockDetails, BlockSideband, ReadTxn, StoredBlock, WriteTxn,
};
use lattice_types::{
    Account, Amount, Block, BlockHash, Epoch, Link, QualifiedRoot, Root, SignatureVerification,
    Timestamp,
};

use crate::constants::LedgerConstants;
use crate::process::LedgerProcessor;
use crate::rollback::RollbackPerformer;
use crate::{LedgerError, ProcessReturn};

pub struct Ledger {
    pub constants: LedgerConstants,
    bootstrap_weights: RwLock<HashMap<Account, Amount>>,
    bootstrap_weight_max_blocks: AtomicU64,
    check_bootstrap_weights: AtomicBool,
}

impl Ledger {
    pub fn new(constants: LedgerConstants) -> Self {
        let max_blocks = constants.bootstrap_weight_max_blocks;
        Self {
            constants,
            bootstrap_weights: RwLock::new(HashMap::new()),
            bootstrap_weight_max_blocks: AtomicU64::new(max_blocks),
            check_bootstrap_weights: AtomicBool::new(true),
        }
    }

    /// Write the genesis block, account and weight into an empty store.
    /// Returns `false` when the store already holds blocks.
    pub fn initialize<T: WriteTxn>(&self, txn: &mut T) -> Result<bool, LedgerError> {
        if txn.block_count()? > 0 {
            return Ok(false);
        }
        let genesis = &self.constants.genesis;
        let hash = genesis.hash();
        let account = self.constants.genesis_account;
        let amount = self.constants.genesis_amount;
        let now = Timestamp::now();

        let sideband = BlockSideband {
            account,
            height: 1,
            balance: amount,
            timestamp: now,
            details: BlockDetails::default(),
            source_epoch: Epoch::Epoch0,
        };
        txn.put_block(genesis, &sideband)?;
        txn.put_account(
            &account,
            &AccountInfo {
                head: hash,
                representative_block: hash,
                open_block: hash,
                balance: amount,
                modified: now,
                block_count: 1,
                epoch: Epoch::Epoch0,
            },
        )?;
        txn.put_frontier(&hash, &account)?;
        let representative = genesis.representative().unwrap_or(account);
        txn.put_weight(&representative, amount)?;

        tracing::info!(genesis = %hash, "initialized ledger with genesis block");
        Ok(true)
    }

    /// Validate `block` and, on progress, apply it inside `txn`.
    ///
    /// `verification` tells the ledger what is already known about the signature;
    /// `Valid` or `ValidEpoch` skips the corresponding check.
    pub fn process<T: WriteTxn>(
        &self,
        txn: &mut T,
        block: &Block,
        verification: SignatureVerification,
    ) -> Result<ProcessReturn, LedgerError> {
        LedgerProcessor::new(self, txn, verification).process(block)
    }

    /// Roll back blocks until `hash` is no longer in the ledger.
    ///
    /// Dependents in other accounts (receives of a rolled back send) are rolled
    /// back first. Every removed hash is appended to `undone` in removal order.
    pub fn rollback<T: WriteTxn>(
        &self,
        txn: &mut T,
        hash: &BlockHash,
        undone: &mut Vec<BlockHash>,
    ) -> Result<(), LedgerError> {
        if !txn.block_exists(hash)? {
            return Err(LedgerError::BlockNotFound(*hash));
        }
        RollbackPerformer::new(self, txn).roll_back(hash, undone)
    }

    // ── Bootstrap weights ──────────────────────────────────────────────

    /// Serve `weights` from [`Ledger::weight`] while the ledger holds fewer than
    /// `max_blocks` blocks.
    pub fn set_bootstrap_weights(&self, weights: HashMap<Account, Amount>, max_blocks: u64) {
        *self
            .bootstrap_weights
            .write()
            .unwrap_or_else(PoisonError::into_inner) = weights;
        self.bootstrap_weight_max_blocks
            .store(max_blocks, Ordering::SeqCst);
        self.check_bootstrap_weights.store(true, Ordering::SeqCst);
    }

    /// Voting weight delegated to `representative`.
    ///
    /// Once the block count reaches the bootstrap threshold the snapshot is
    /// abandoned for good.
    pub fn weight<T: ReadTxn>(
        &self,
        txn: &T,
        representative: &Account,
    ) -> Result<Amount, LedgerError> {
        if self.check_bootstrap_weights.load(Ordering::SeqCst) {
            let max_blocks = self.bootstrap_weight_max_blocks.load(Ordering::SeqCst);
            if txn.block_count()? < max_blocks {
                let weights = self
                    .bootstrap_weights
                    .read()
                    .unwrap_or_else(PoisonError::into_inner);
                if let Some(weight) = weights.get(representative) {
                    return Ok(*weight);
                }
            } else {
                self.check_bootstrap_weights.store(false, Ordering::SeqCst);
            }
        }
        Ok(txn.get_weight(representative)?)
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn block_exists<T: ReadTxn>(&self, txn: &T, hash: &BlockHash) -> Result<bool, LedgerError> {
        Ok(txn.block_exists(hash)?)
    }

    pub fn get_block<T: ReadTxn>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<Option<StoredBlock>, LedgerError> {
        Ok(txn.get_block(hash)?)
    }

    /// Account balance after block `hash`.
    pub fn balance<T: ReadTxn>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<Option<Amount>, LedgerError> {
        Ok(txn.get_block(hash)?.map(|stored| stored.sideband.balance))
    }

    pub fn account_balance<T: ReadTxn>(
        &self,
        txn: &T,
        account: &Account,
    ) -> Result<Amount, LedgerError> {
        Ok(txn
            .get_account(account)?
            .map(|info| info.balance)
            .unwrap_or_default())
    }

    /// Sum of all sends to `account` not yet received.
    pub fn account_receivable<T: ReadTxn>(
        &self,
        txn: &T,
        account: &Account,
    ) -> Result<Amount, LedgerError> {
        Ok(txn
            .pending_for_account(account)?
            .into_iter()
            .fold(Amount::ZERO, |sum, (_, info)| sum.wrapping_add(info.amount)))
    }

    /// Head block of `account`.
    pub fn latest<T: ReadTxn>(
        &self,
        txn: &T,
        account: &Account,
    ) -> Result<Option<BlockHash>, LedgerError> {
        Ok(txn.get_account(account)?.map(|info| info.head))
    }

    /// Root for the next block of `account`: its head, or the account itself if unopened.
    pub fn latest_root<T: ReadTxn>(&self, txn: &T, account: &Account) -> Result<Root, LedgerError> {
        Ok(match txn.get_account(account)? {
            Some(info) => info.head.as_root(),
            None => (*account).into(),
        })
    }

    /// Owner of block `hash`.
    pub fn account<T: ReadTxn>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<Option<Account>, LedgerError> {
        Ok(txn.get_block(hash)?.map(|stored| stored.sideband.account))
    }

    /// Value moved by block `hash`: the absolute balance change against its predecessor.
    pub fn amount<T: ReadTxn>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<Option<Amount>, LedgerError> {
        let Some(stored) = txn.get_block(hash)? else {
            return Ok(None);
        };
        let balance = stored.sideband.balance;
        let previous = stored.block.previous();
        if previous.is_zero() {
            return Ok(Some(balance));
        }
        let previous_balance = self
            .balance(txn, &previous)?
            .ok_or(LedgerError::BlockNotFound(previous))?;
        Ok(Some(if balance > previous_balance {
            balance - previous_balance
        } else {
            previous_balance - balance
        }))
    }

    /// The most recent block at or before `hash` that names a representative.
    pub fn representative_block<T: ReadTxn>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<Option<BlockHash>, LedgerError> {
        let mut current = *hash;
        while !current.is_zero() {
            let Some(stored) = txn.get_block(&current)? else {
                return Ok(None);
            };
            if stored.block.representative().is_some() {
                return Ok(Some(current));
            }
            current = stored.block.previous();
        }
        Ok(None)
    }

    /// Current representative of `account`.
    pub fn representative<T: ReadTxn>(
        &self,
        txn: &T,
        account: &Account,
    ) -> Result<Option<Account>, LedgerError> {
        match txn.get_account(account)? {
            Some(info) => self.representative_of_block(txn, &info.representative_block),
            None => Ok(None),
        }
    }

    pub(crate) fn representative_of_block<T: ReadTxn>(
        &self,
        txn: &T,
        rep_block: &BlockHash,
    ) -> Result<Option<Account>, LedgerError> {
        Ok(txn
            .get_block(rep_block)?
            .and_then(|stored| stored.block.representative()))
    }

    /// The block currently occupying `root`'s slot, if any.
    pub fn successor<T: ReadTxn>(
        &self,
        txn: &T,
        root: &QualifiedRoot,
    ) -> Result<Option<BlockHash>, LedgerError> {
        if root.previous.is_zero() {
            if let Some(info) = txn.get_account(&root.root.as_account())? {
                return Ok(Some(info.open_block));
            }
        }
        Ok(txn.get_successor(&root.previous)?)
    }

    /// The block in the ledger that competes with `block` for its slot.
    pub fn forked_block<T: ReadTxn>(
        &self,
        txn: &T,
        block: &Block,
    ) -> Result<Option<Block>, LedgerError> {
        let Some(hash) = self.successor(txn, &block.qualified_root())? else {
            return Ok(None);
        };
        Ok(txn.get_block(&hash)?.map(|stored| stored.block))
    }

    /// Whether `block` spends: legacy sends always, state blocks when the balance drops.
    pub fn is_send<T: ReadTxn>(&self, txn: &T, block: &Block) -> Result<bool, LedgerError> {
        match block {
            Block::Send(_) => Ok(true),
            Block::State(state) => {
                let previous = state.hashables().previous;
                if previous.is_zero() {
                    return Ok(false);
                }
                let previous_balance = self.balance(txn, &previous)?.unwrap_or_default();
                Ok(state.hashables().balance < previous_balance)
            }
            _ => Ok(false),
        }
    }

    /// Hash of the send that `block` receives; zero when it receives nothing.
    pub fn block_source<T: ReadTxn>(
        &self,
        txn: &T,
        block: &Block,
    ) -> Result<BlockHash, LedgerError> {
        match block {
            Block::State(state) if !self.is_send(txn, block)? => {
                Ok(state.hashables().link.as_block_hash())
            }
            _ => Ok(block.source()),
        }
    }

    /// Recipient of a send; zero for anything else.
    pub fn block_destination<T: ReadTxn>(
        &self,
        txn: &T,
        block: &Block,
    ) -> Result<Account, LedgerError> {
        match block {
            Block::Send(send) => Ok(send.hashables().destination),
            Block::State(state) if self.is_send(txn, block)? => {
                Ok(state.hashables().link.as_account())
            }
            _ => Ok(Account::ZERO),
        }
    }

    /// Blocks that must be in the ledger before `block` can be: its previous and
    /// the send it receives. Zero entries mean "no dependency".
    pub fn dependent_blocks<T: ReadTxn>(
        &self,
        txn: &T,
        block: &Block,
    ) -> Result<[BlockHash; 2], LedgerError> {
        let previous = block.previous();
        let source = match block {
            Block::Receive(_) | Block::Open(_) => block.source(),
            Block::State(state) => {
                let link = state.hashables().link;
                if self.is_send(txn, block)? || self.is_epoch_link(&link) {
                    BlockHash::ZERO
                } else {
                    link.as_block_hash()
                }
            }
            Block::Send(_) | Block::Change(_) => BlockHash::ZERO,
        };
        Ok([previous, source])
    }

    /// Whether every dependency of `block` is already in the ledger.
    pub fn could_fit<T: ReadTxn>(&self, txn: &T, block: &Block) -> Result<bool, LedgerError> {
        for dependency in self.dependent_blocks(txn, block)? {
            if !dependency.is_zero() && !txn.block_exists(&dependency)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn is_epoch_link(&self, link: &Link) -> bool {
        self.constants.epochs.is_epoch_link(link)
    }

    pub fn epoch_signer(&self, link: &Link) -> Option<Account> {
        self.constants.epochs.signer(link)
    }

    pub fn epoch_link(&self, epoch: Epoch) -> Option<Link> {
        self.constants.epochs.link(epoch)
    }

    // ── Write helpers shared by process and rollback ───────────────────

    pub(crate) fn add_weight<T: WriteTxn>(
        &self,
        txn: &mut T,
        representative: &Account,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let weight = txn.get_weight(representative)?;
        txn.put_weight(representative, weight.wrapping_add(amount))?;
        Ok(())
    }

    pub(crate) fn sub_weight<T: WriteTxn>(
        &self,
        txn: &mut T,
        representative: &Account,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let weight = txn.get_weight(representative)?;
        txn.put_weight(representative, weight.wrapping_sub(amount))?;
        Ok(())
    }

    /// Replace the account record; a zero head removes the account.
    pub(crate) fn update_account<T: WriteTxn>(
        &self,
        txn: &mut T,
        account: &Account,
        info: &AccountInfo,
    ) -> Result<(), LedgerError> {
        if info.head.is_zero() {
            txn.delete_account(account)?;
        } else {
            txn.put_account(account, info)?;
        }
        Ok(())
    }
}
