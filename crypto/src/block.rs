//! Signed block construction and block signature verification.
//!
//! A block signature covers the 32-byte block hash only.

use lattice_types::{
    Account, Amount, Block, BlockHash, ChangeBlock, ChangeHashables, KeyPair, Link, OpenBlock,
    OpenHashables, PrivateKey, ReceiveBlock, ReceiveHashables, SendBlock, SendHashables,
    Signature, StateBlock, StateHashables,
};

use crate::sign::{sign_message, verify_signature};

pub fn sign_hash(hash: &BlockHash, private: &PrivateKey) -> Signature {
    sign_message(hash.as_bytes(), private)
}

pub fn verify_block_signature(block: &Block, signer: &Account) -> bool {
    verify_signature(block.hash().as_bytes(), block.signature(), signer)
}

pub fn send_block(
    previous: BlockHash,
    destination: Account,
    balance: Amount,
    keys: &KeyPair,
    work: u64,
) -> Block {
    let hashables = SendHashables {
        previous,
        destination,
        balance,
    };
    let signature = sign_hash(&hashables.hash(), &keys.private);
    Block::Send(SendBlock::new(hashables, signature, work))
}

pub fn receive_block(previous: BlockHash, source: BlockHash, keys: &KeyPair, work: u64) -> Block {
    let hashables = ReceiveHashables { previous, source };
    let signature = sign_hash(&hashables.hash(), &keys.private);
    Block::Receive(ReceiveBlock::new(hashables, signature, work))
}

/// Open block for `keys.account`.
pub fn open_block(
    source: BlockHash,
    representative: Account,
    keys: &KeyPair,
    work: u64,
) -> Block {
    let hashables = OpenHashables {
        source,
        representative,
        account: keys.account,
    };
    let signature = sign_hash(&hashables.hash(), &keys.private);
    Block::Open(OpenBlock::new(hashables, signature, work))
}

pub fn change_block(
    previous: BlockHash,
    representative: Account,
    keys: &KeyPair,
    work: u64,
) -> Block {
    let hashables = ChangeHashables {
        previous,
        representative,
    };
    let signature = sign_hash(&hashables.hash(), &keys.private);
    Block::Change(ChangeBlock::new(hashables, signature, work))
}

/// State block for `account`, signed by `signer`. The signer is the account owner
/// for ordinary blocks and the epoch signer for epoch upgrades.
pub fn state_block(
    account: Account,
    previous: BlockHash,
    representative: Account,
    balance: Amount,
    link: Link,
    signer: &KeyPair,
    work: u64,
) -> Block {
    let hashables = StateHashables {
        account,
        previous,
        representative,
        balance,
        link,
    };
    let signature = sign_hash(&hashables.hash(), &signer.private);
    Block::State(StateBlock::new(hashables, signature, work))
}
