//! Per block type validation and commit.
//!
//! Checks run in a fixed order and the first failure decides the verdict.
//! Nothing is written to the transaction unless every check passes.

use lattice_crypto::verify_block_signature;
use lattice_store::{AccountInfo, BlockDetails, BlockSideband, PendingInfo, PendingKey, WriteTxn};
use lattice_types::{
    Account, Amount, Block, ChangeBlock, Epoch, Epochs, OpenBlock, ReceiveBlock, SendBlock,
    SignatureVerification, StateBlock, Timestamp,
};

use crate::{Ledger, LedgerError, ProcessResult, ProcessReturn};

pub(crate) struct LedgerProcessor<'a, T> {
    ledger: &'a Ledger,
    txn: &'a mut T,
    /// Single timestamp for the sideband and the account record.
    now: Timestamp,
    result: ProcessReturn,
}

impl<'a, T: WriteTxn> LedgerProcessor<'a, T> {
    pub(crate) fn new(
        ledger: &'a Ledger,
        txn: &'a mut T,
        verified: SignatureVerification,
    ) -> Self {
        Self {
            ledger,
            txn,
            now: Timestamp::now(),
            result: ProcessReturn::new(verified),
        }
    }

    pub(crate) fn process(mut self, block: &Block) -> Result<ProcessReturn, LedgerError> {
        let code = match block {
            Block::Send(send) => self.send(block, send)?,
            Block::Receive(receive) => self.receive(block, receive)?,
            Block::Open(open) => self.open(block, open)?,
            Block::Change(change) => self.change(block, change)?,
            Block::State(state) => self.state(block, state)?,
        };
        self.result.code = code;
        Ok(self.result)
    }

    fn send(&mut self, block: &Block, send: &SendBlock) -> Result<ProcessResult, LedgerError> {
        let hash = block.hash();
        let previous = send.hashables().previous;
        if self.txn.block_exists(&hash)? {
            return Ok(ProcessResult::Old);
        }
        let Some(previous_block) = self.txn.get_block(&previous)? else {
            return Ok(ProcessResult::GapPrevious);
        };
        if !block.valid_predecessor(previous_block.block.block_type()) {
            return Ok(ProcessResult::BlockPosition);
        }
        // Only the head of a legacy chain has a frontier entry.
        let Some(account) = self.txn.get_frontier(&previous)? else {
            return Ok(ProcessResult::Fork);
        };
        if !self.check_signature(block, &account, SignatureVerification::Valid) {
            return Ok(ProcessResult::BadSignature);
        }
        let info = self.account_info(&account)?;
        let balance = send.hashables().balance;
        if info.balance < balance {
            return Ok(ProcessResult::NegativeSpend);
        }

        let amount = info.balance - balance;
        let representative = self.representative(&info)?;
        self.ledger.sub_weight(self.txn, &representative, amount)?;
        self.put_block(
            block,
            account,
            info.block_count + 1,
            balance,
            BlockDetails::default(),
            Epoch::Epoch0,
        )?;
        let new_info = AccountInfo {
            head: hash,
            balance,
            modified: self.now,
            block_count: info.block_count + 1,
            epoch: Epoch::Epoch0,
            ..info.clone()
        };
        self.ledger.update_account(self.txn, &account, &new_info)?;
        let destination = send.hashables().destination;
        self.txn.put_pending(
            &PendingKey::new(destination, hash),
            &PendingInfo {
                source: account,
                amount,
                epoch: Epoch::Epoch0,
            },
        )?;
        self.txn.delete_frontier(&previous)?;
        self.txn.put_frontier(&hash, &account)?;

        self.result.account = account;
        self.result.amount = amount;
        self.result.pending_account = destination;
        self.result.previous_balance = info.balance;
        Ok(ProcessResult::Progress)
    }

    fn receive(
        &mut self,
        block: &Block,
        receive: &ReceiveBlock,
    ) -> Result<ProcessResult, LedgerError> {
        let hash = block.hash();
        let previous = receive.hashables().previous;
        let source = receive.hashables().source;
        if self.txn.block_exists(&hash)? {
            return Ok(ProcessResult::Old);
        }
        let Some(previous_block) = self.txn.get_block(&previous)? else {
            return Ok(ProcessResult::GapPrevious);
        };
        if !block.valid_predecessor(previous_block.block.block_type()) {
            return Ok(ProcessResult::BlockPosition);
        }
        // The previous block exists but is no longer a head.
        let Some(account) = self.txn.get_frontier(&previous)? else {
            return Ok(ProcessResult::Fork);
        };
        if !self.check_signature(block, &account, SignatureVerification::Valid) {
            return Ok(ProcessResult::BadSignature);
        }
        if !self.txn.block_exists(&source)? {
            return Ok(ProcessResult::GapSource);
        }
        let info = self.account_info(&account)?;
        if info.head != previous {
            return Ok(ProcessResult::GapPrevious);
        }
        let key = PendingKey::new(account, source);
        let Some(pending) = self.txn.get_pending(&key)? else {
            return Ok(ProcessResult::Unreceivable);
        };
        // Legacy blocks cannot receive sends made by upgraded accounts.
        if pending.epoch != Epoch::Epoch0 {
            return Ok(ProcessResult::Unreceivable);
        }

        let balance = info.balance.wrapping_add(pending.amount);
        self.txn.delete_pending(&key)?;
        self.put_block(
            block,
            account,
            info.block_count + 1,
            balance,
            BlockDetails::default(),
            Epoch::Epoch0,
        )?;
        let new_info = AccountInfo {
            head: hash,
            balance,
            modified: self.now,
            block_count: info.block_count + 1,
            epoch: Epoch::Epoch0,
            ..info.clone()
        };
        self.ledger.update_account(self.txn, &account, &new_info)?;
        let representative = self.representative(&info)?;
        self.ledger.add_weight(self.txn, &representative, pending.amount)?;
        self.txn.delete_frontier(&previous)?;
        self.txn.put_frontier(&hash, &account)?;

        self.result.account = account;
        self.result.amount = pending.amount;
        self.result.previous_balance = info.balance;
        Ok(ProcessResult::Progress)
    }

    fn open(&mut self, block: &Block, open: &OpenBlock) -> Result<ProcessResult, LedgerError> {
        let hash = block.hash();
        let account = open.hashables().account;
        let source = open.hashables().source;
        if self.txn.block_exists(&hash)? {
            return Ok(ProcessResult::Old);
        }
        if !self.check_signature(block, &account, SignatureVerification::Valid) {
            return Ok(ProcessResult::BadSignature);
        }
        if !self.txn.block_exists(&source)? {
            return Ok(ProcessResult::GapSource);
        }
        if self.txn.account_exists(&account)? {
            return Ok(ProcessResult::Fork);
        }
        let key = PendingKey::new(account, source);
        let Some(pending) = self.txn.get_pending(&key)? else {
            return Ok(ProcessResult::Unreceivable);
        };
        if account == self.ledger.constants.burn_account {
            return Ok(ProcessResult::OpenedBurnAccount);
        }
        if pending.epoch != Epoch::Epoch0 {
            return Ok(ProcessResult::Unreceivable);
        }

        self.txn.delete_pending(&key)?;
        self.put_block(block, account, 1, pending.amount, BlockDetails::default(), Epoch::Epoch0)?;
        let new_info = AccountInfo {
            head: hash,
            representative_block: hash,
            open_block: hash,
            balance: pending.amount,
            modified: self.now,
            block_count: 1,
            epoch: Epoch::Epoch0,
        };
        self.ledger.update_account(self.txn, &account, &new_info)?;
        self.ledger
            .add_weight(self.txn, &open.hashables().representative, pending.amount)?;
        self.txn.put_frontier(&hash, &account)?;

        self.result.account = account;
        self.result.amount = pending.amount;
        Ok(ProcessResult::Progress)
    }

    fn change(
        &mut self,
        block: &Block,
        change: &ChangeBlock,
    ) -> Result<ProcessResult, LedgerError> {
        let hash = block.hash();
        let previous = change.hashables().previous;
        if self.txn.block_exists(&hash)? {
            return Ok(ProcessResult::Old);
        }
        let Some(previous_block) = self.txn.get_block(&previous)? else {
            return Ok(ProcessResult::GapPrevious);
        };
        if !block.valid_predecessor(previous_block.block.block_type()) {
            return Ok(ProcessResult::BlockPosition);
        }
        let Some(account) = self.txn.get_frontier(&previous)? else {
            return Ok(ProcessResult::Fork);
        };
        let info = self.account_info(&account)?;
        if !self.check_signature(block, &account, SignatureVerification::Valid) {
            return Ok(ProcessResult::BadSignature);
        }

        self.put_block(
            block,
            account,
            info.block_count + 1,
            info.balance,
            BlockDetails::default(),
            Epoch::Epoch0,
        )?;
        let old_representative = self.representative(&info)?;
        self.ledger
            .sub_weight(self.txn, &old_representative, info.balance)?;
        self.ledger
            .add_weight(self.txn, &change.hashables().representative, info.balance)?;
        let new_info = AccountInfo {
            head: hash,
            representative_block: hash,
            modified: self.now,
            block_count: info.block_count + 1,
            epoch: Epoch::Epoch0,
            ..info.clone()
        };
        self.ledger.update_account(self.txn, &account, &new_info)?;
        self.txn.delete_frontier(&previous)?;
        self.txn.put_frontier(&hash, &account)?;

        self.result.account = account;
        self.result.previous_balance = info.balance;
        Ok(ProcessResult::Progress)
    }

    fn state(&mut self, block: &Block, state: &StateBlock) -> Result<ProcessResult, LedgerError> {
        if self.ledger.is_epoch_link(&state.hashables().link) {
            let (code, is_epoch) = self.classify_epoch_link(block, state)?;
            if code != ProcessResult::Progress {
                return Ok(code);
            }
            if is_epoch {
                return self.epoch(block, state);
            }
        }
        self.state_impl(block, state)
    }

    /// A block carrying an epoch link is an epoch block only when it leaves the
    /// balance unchanged; otherwise it is an ordinary send to the link account.
    fn classify_epoch_link(
        &mut self,
        block: &Block,
        state: &StateBlock,
    ) -> Result<(ProcessResult, bool), LedgerError> {
        let previous = state.hashables().previous;
        let mut previous_balance = Amount::ZERO;
        if !previous.is_zero() {
            match self.ledger.balance(&*self.txn, &previous)? {
                Some(balance) => previous_balance = balance,
                None => {
                    // Record which key signed it so the gap entry carries the verdict.
                    if self.result.verified == SignatureVerification::Unknown {
                        let signer = self
                            .ledger
                            .epoch_signer(&state.hashables().link)
                            .unwrap_or_default();
                        if verify_block_signature(block, &state.hashables().account) {
                            self.result.verified = SignatureVerification::Valid;
                        } else if verify_block_signature(block, &signer) {
                            self.result.verified = SignatureVerification::ValidEpoch;
                        } else {
                            self.result.verified = SignatureVerification::Invalid;
                            return Ok((ProcessResult::BadSignature, false));
                        }
                    }
                    return Ok((ProcessResult::GapPrevious, false));
                }
            }
        }
        let unchanged = state.hashables().balance == previous_balance;
        Ok((ProcessResult::Progress, unchanged))
    }

    fn state_impl(
        &mut self,
        block: &Block,
        state: &StateBlock,
    ) -> Result<ProcessResult, LedgerError> {
        let hash = block.hash();
        let h = state.hashables();
        if self.txn.block_exists(&hash)? {
            return Ok(ProcessResult::Old);
        }
        if !self.check_signature(block, &h.account, SignatureVerification::Valid) {
            return Ok(ProcessResult::BadSignature);
        }
        if h.account.is_zero() {
            return Ok(ProcessResult::OpenedBurnAccount);
        }

        let mut epoch = Epoch::Epoch0;
        let mut source_epoch = Epoch::Epoch0;
        let mut amount = h.balance;
        let mut is_send = false;
        let is_receive;
        let existing = self.txn.get_account(&h.account)?;
        let info = existing.clone().unwrap_or_default();
        match &existing {
            Some(info) => {
                epoch = info.epoch;
                self.result.previous_balance = info.balance;
                if h.previous.is_zero() {
                    return Ok(ProcessResult::Fork);
                }
                if !self.txn.block_exists(&h.previous)? {
                    return Ok(ProcessResult::GapPrevious);
                }
                is_send = h.balance < info.balance;
                is_receive = !is_send && !h.link.is_zero();
                amount = if is_send {
                    info.balance - h.balance
                } else {
                    h.balance.wrapping_sub(info.balance)
                };
                if h.previous != info.head {
                    return Ok(ProcessResult::Fork);
                }
            }
            None => {
                if !h.previous.is_zero() {
                    return Ok(ProcessResult::GapPrevious);
                }
                is_receive = true;
                if h.link.is_zero() {
                    return Ok(ProcessResult::GapSource);
                }
            }
        }

        if !is_send {
            if !h.link.is_zero() {
                let source = h.link.as_block_hash();
                if !self.txn.block_exists(&source)? {
                    return Ok(ProcessResult::GapSource);
                }
                let key = PendingKey::new(h.account, source);
                let Some(pending) = self.txn.get_pending(&key)? else {
                    return Ok(ProcessResult::Unreceivable);
                };
                if amount != pending.amount {
                    return Ok(ProcessResult::BalanceMismatch);
                }
                source_epoch = pending.epoch;
                epoch = epoch.max(source_epoch);
            } else if !amount.is_zero() {
                // No link: only the representative may change.
                return Ok(ProcessResult::BalanceMismatch);
            }
        }

        let details = BlockDetails {
            epoch,
            is_send,
            is_receive,
            is_epoch: false,
        };
        self.put_block(block, h.account, info.block_count + 1, h.balance, details, source_epoch)?;
        if existing.is_some() {
            let old_representative = self.representative(&info)?;
            self.ledger
                .sub_weight(self.txn, &old_representative, info.balance)?;
        }
        self.ledger.add_weight(self.txn, &h.representative, h.balance)?;
        if is_send {
            let destination = h.link.as_account();
            self.txn.put_pending(
                &PendingKey::new(destination, hash),
                &PendingInfo {
                    source: h.account,
                    amount,
                    epoch,
                },
            )?;
            self.result.pending_account = destination;
        } else if !h.link.is_zero() {
            self.txn
                .delete_pending(&PendingKey::new(h.account, h.link.as_block_hash()))?;
        }
        let new_info = AccountInfo {
            head: hash,
            representative_block: hash,
            open_block: if info.open_block.is_zero() {
                hash
            } else {
                info.open_block
            },
            balance: h.balance,
            modified: self.now,
            block_count: info.block_count + 1,
            epoch,
        };
        self.ledger.update_account(self.txn, &h.account, &new_info)?;
        if !info.head.is_zero() && self.txn.get_frontier(&info.head)?.is_some() {
            self.txn.delete_frontier(&info.head)?;
        }

        self.result.account = h.account;
        self.result.amount = amount;
        Ok(ProcessResult::Progress)
    }

    fn epoch(&mut self, block: &Block, state: &StateBlock) -> Result<ProcessResult, LedgerError> {
        let hash = block.hash();
        let h = state.hashables();
        if self.txn.block_exists(&hash)? {
            return Ok(ProcessResult::Old);
        }
        let signer = self.ledger.epoch_signer(&h.link).unwrap_or_default();
        if !self.check_signature(block, &signer, SignatureVerification::ValidEpoch) {
            return Ok(ProcessResult::BadSignature);
        }
        if h.account.is_zero() {
            return Ok(ProcessResult::OpenedBurnAccount);
        }

        let existing = self.txn.get_account(&h.account)?;
        let info = existing.clone().unwrap_or_default();
        match &existing {
            Some(info) => {
                self.result.previous_balance = info.balance;
                if h.previous.is_zero() || h.previous != info.head {
                    return Ok(ProcessResult::Fork);
                }
                let representative = self
                    .ledger
                    .representative_of_block(&*self.txn, &info.representative_block)?;
                if representative != Some(h.representative) {
                    return Ok(ProcessResult::RepresentativeMismatch);
                }
            }
            None => {
                if !h.previous.is_zero() {
                    return Ok(ProcessResult::GapPrevious);
                }
                if !h.representative.is_zero() {
                    return Ok(ProcessResult::RepresentativeMismatch);
                }
            }
        }

        let Some(epoch) = self.ledger.constants.epochs.epoch(&h.link) else {
            return Ok(ProcessResult::BlockPosition);
        };
        // An unopened account may jump straight to any epoch.
        if existing.is_some() && !Epochs::is_sequential(info.epoch, epoch) {
            return Ok(ProcessResult::BlockPosition);
        }
        if h.balance != info.balance {
            return Ok(ProcessResult::BalanceMismatch);
        }

        let details = BlockDetails {
            epoch,
            is_send: false,
            is_receive: false,
            is_epoch: true,
        };
        self.put_block(
            block,
            h.account,
            info.block_count + 1,
            info.balance,
            details,
            Epoch::Epoch0,
        )?;
        let new_info = AccountInfo {
            head: hash,
            representative_block: hash,
            open_block: if info.open_block.is_zero() {
                hash
            } else {
                info.open_block
            },
            balance: info.balance,
            modified: self.now,
            block_count: info.block_count + 1,
            epoch,
        };
        self.ledger.update_account(self.txn, &h.account, &new_info)?;
        if !info.head.is_zero() && self.txn.get_frontier(&info.head)?.is_some() {
            self.txn.delete_frontier(&info.head)?;
        }

        self.result.account = h.account;
        Ok(ProcessResult::Progress)
    }

    // ── Helpers ────────────────────────────────────────────────────────

    /// Verify the signature unless the caller already vouched for it with
    /// `vouched`. On success the result records `vouched`.
    fn check_signature(
        &mut self,
        block: &Block,
        signer: &Account,
        vouched: SignatureVerification,
    ) -> bool {
        if self.result.verified != vouched && !verify_block_signature(block, signer) {
            return false;
        }
        self.result.verified = vouched;
        true
    }

    fn account_info(&self, account: &Account) -> Result<AccountInfo, LedgerError> {
        self.txn
            .get_account(account)?
            .ok_or_else(|| {
                LedgerError::Inconsistent(format!("frontier names unknown account {account}"))
            })
    }

    fn representative(&self, info: &AccountInfo) -> Result<Account, LedgerError> {
        self.ledger
            .representative_of_block(&*self.txn, &info.representative_block)?
            .ok_or(LedgerError::BlockNotFound(info.representative_block))
    }

    /// Store the block body with its sideband and link it from its predecessor.
    fn put_block(
        &mut self,
        block: &Block,
        account: Account,
        height: u64,
        balance: Amount,
        details: BlockDetails,
        source_epoch: Epoch,
    ) -> Result<(), LedgerError> {
        let sideband = BlockSideband {
            account,
            height,
            balance,
            timestamp: self.now,
            details,
            source_epoch,
        };
        self.txn.put_block(block, &sideband)?;
        let previous = block.previous();
        if !previous.is_zero() {
            self.txn.put_successor(&previous, &block.hash())?;
        }
        Ok(())
    }
}
