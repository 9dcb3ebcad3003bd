//! Undo of an account's head block.
//!
//! Each step plans the inverse of the current head, then applies it. A send
//! whose pending entry was already received cannot be undone directly: the
//! receiving account's head is rolled back first and the step is retried.

use lattice_store::{AccountInfo, PendingInfo, PendingKey, StoredBlock, WriteTxn};
use lattice_types::{Account, Amount, Block, BlockHash};

use crate::{Ledger, LedgerError};

enum RollbackStep {
    RollBackBlock(RollbackInstructions),
    RequestDependencyRollback(BlockHash),
}

#[derive(Default)]
struct RollbackInstructions {
    block_hash: BlockHash,
    account: Account,
    remove_pending: Option<PendingKey>,
    add_pending: Option<(PendingKey, PendingInfo)>,
    set_account_info: AccountInfo,
    delete_frontier: Option<BlockHash>,
    add_frontier: Option<(BlockHash, Account)>,
    clear_successor: Option<BlockHash>,
    /// Weight to take from the current representative.
    remove_weight: (Account, Amount),
    /// Weight to give back to the previous representative.
    restore_weight: Option<(Account, Amount)>,
}

pub(crate) struct RollbackPerformer<'a, T> {
    ledger: &'a Ledger,
    txn: &'a mut T,
}

impl<'a, T: WriteTxn> RollbackPerformer<'a, T> {
    pub(crate) fn new(ledger: &'a Ledger, txn: &'a mut T) -> Self {
        Self { ledger, txn }
    }

    pub(crate) fn roll_back(
        mut self,
        hash: &BlockHash,
        undone: &mut Vec<BlockHash>,
    ) -> Result<(), LedgerError> {
        let account = self
            .ledger
            .account(&*self.txn, hash)?
            .ok_or(LedgerError::BlockNotFound(*hash))?;
        while self.txn.block_exists(hash)? {
            let info = self.txn.get_account(&account)?.ok_or_else(|| {
                LedgerError::Inconsistent(format!("block {hash} has no account record"))
            })?;
            let head = self.load_block(&info.head)?;
            match self.plan(&account, &info, &head)? {
                RollbackStep::RollBackBlock(instructions) => {
                    self.apply(instructions)?;
                    tracing::debug!(hash = %info.head, account = %account, "rolled back block");
                    undone.push(info.head);
                }
                RollbackStep::RequestDependencyRollback(dependency) => {
                    self.ledger.rollback(self.txn, &dependency, undone)?;
                }
            }
        }
        Ok(())
    }

    fn plan(
        &self,
        account: &Account,
        info: &AccountInfo,
        head: &StoredBlock,
    ) -> Result<RollbackStep, LedgerError> {
        let block = &head.block;
        let hash = head.hash();
        let previous_hash = block.previous();
        let previous = if previous_hash.is_zero() {
            None
        } else {
            Some(self.load_block(&previous_hash)?)
        };
        let previous_balance = previous
            .as_ref()
            .map(|stored| stored.sideband.balance)
            .unwrap_or_default();

        let mut instructions = RollbackInstructions {
            block_hash: hash,
            account: *account,
            ..Default::default()
        };

        let details = &head.sideband.details;
        let (is_send, is_receive) = match block {
            Block::Send(_) => (true, false),
            Block::Receive(_) | Block::Open(_) => (false, true),
            Block::Change(_) => (false, false),
            Block::State(_) => (details.is_send, details.is_receive),
        };

        if is_send {
            let destination = self.ledger.block_destination(&*self.txn, block)?;
            let key = PendingKey::new(destination, hash);
            if !self.txn.pending_exists(&key)? {
                // Already received: undo the receiving side first.
                let latest = self.ledger.latest(&*self.txn, &destination)?.ok_or_else(|| {
                    LedgerError::Inconsistent(format!(
                        "send {hash} was received but {destination} has no chain"
                    ))
                })?;
                return Ok(RollbackStep::RequestDependencyRollback(latest));
            }
            instructions.remove_pending = Some(key);
        } else if is_receive {
            let source = self.ledger.block_source(&*self.txn, block)?;
            let source_account = self
                .ledger
                .account(&*self.txn, &source)?
                .unwrap_or_default();
            instructions.add_pending = Some((
                PendingKey::new(*account, source),
                PendingInfo {
                    source: source_account,
                    amount: info.balance.wrapping_sub(previous_balance),
                    epoch: head.sideband.source_epoch,
                },
            ));
        }

        let current_representative = self
            .ledger
            .representative_of_block(&*self.txn, &info.representative_block)?
            .unwrap_or_default();
        instructions.remove_weight = (current_representative, info.balance);

        instructions.set_account_info = match &previous {
            None => AccountInfo::default(),
            Some(previous) => {
                let representative_block = self
                    .ledger
                    .representative_block(&*self.txn, &previous_hash)?
                    .ok_or(LedgerError::BlockNotFound(previous_hash))?;
                let previous_representative = self
                    .ledger
                    .representative_of_block(&*self.txn, &representative_block)?
                    .unwrap_or_default();
                instructions.restore_weight = Some((previous_representative, previous_balance));
                AccountInfo {
                    head: previous_hash,
                    representative_block,
                    open_block: info.open_block,
                    balance: previous_balance,
                    modified: previous.sideband.timestamp,
                    block_count: info.block_count - 1,
                    epoch: previous.sideband.details.epoch,
                }
            }
        };

        if block.block_type().is_legacy() {
            instructions.delete_frontier = Some(hash);
        }
        if let Some(previous) = &previous {
            if previous.block.block_type().is_legacy() {
                instructions.add_frontier = Some((previous_hash, *account));
            }
            instructions.clear_successor = Some(previous_hash);
        }

        Ok(RollbackStep::RollBackBlock(instructions))
    }

    fn apply(&mut self, instructions: RollbackInstructions) -> Result<(), LedgerError> {
        if let Some(key) = &instructions.remove_pending {
            self.txn.delete_pending(key)?;
        }
        if let Some((key, info)) = &instructions.add_pending {
            self.txn.put_pending(key, info)?;
        }
        let (representative, amount) = instructions.remove_weight;
        self.ledger.sub_weight(self.txn, &representative, amount)?;
        if let Some((representative, amount)) = instructions.restore_weight {
            self.ledger.add_weight(self.txn, &representative, amount)?;
        }
        self.ledger.update_account(
            self.txn,
            &instructions.account,
            &instructions.set_account_info,
        )?;
        self.txn.delete_block(&instructions.block_hash)?;
        if let Some(hash) = &instructions.delete_frontier {
            self.txn.delete_frontier(hash)?;
        }
        if let Some((hash, account)) = &instructions.add_frontier {
            self.txn.put_frontier(hash, account)?;
        }
        if let Some(hash) = &instructions.clear_successor {
            self.txn.delete_successor(hash)?;
        }
        Ok(())
    }

    fn load_block(&self, hash: &BlockHash) -> Result<StoredBlock, LedgerError> {
        self.txn
            .get_block(hash)?
            .ok_or(LedgerError::BlockNotFound(*hash))
    }
}
