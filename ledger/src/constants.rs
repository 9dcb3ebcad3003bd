//! Per-network ledger constants: genesis, epochs, burn account.

use lattice_crypto::{keypair_from_private, open_block};
use lattice_types::{Account, Amount, Block, Epoch, Epochs, KeyPair, Link, PrivateKey};

/// Private key of the dev network genesis account. Published so that local
/// networks and tests can spend the genesis supply and sign epoch blocks.
const DEV_GENESIS_PRIVATE_KEY: [u8; 32] = [
    0x34, 0xf0, 0xa3, 0x7a, 0xad, 0x20, 0xf4, 0xa2, 0x60, 0xf0, 0xa5, 0xb3, 0xcb, 0x3d, 0x7f,
    0xb5, 0x06, 0x73, 0x21, 0x22, 0x63, 0xe5, 0x8a, 0x38, 0x0b, 0xc1, 0x04, 0x74, 0xbb, 0x03,
    0x9c, 0xe4,
];

const DEV_BOOTSTRAP_WEIGHT_MAX_BLOCKS: u64 = 0;

#[derive(Clone, Debug)]
pub struct LedgerConstants {
    pub genesis: Block,
    pub genesis_account: Account,
    pub genesis_amount: Amount,
    pub burn_account: Account,
    pub epochs: Epochs,
    /// Below this many blocks, `weight` may be served from the bootstrap snapshot.
    pub bootstrap_weight_max_blocks: u64,
}

impl LedgerConstants {
    pub fn dev() -> Self {
        let keys = Self::dev_genesis_keys();
        let genesis = open_block(keys.account.as_link().as_block_hash(), keys.account, &keys, 0);
        let mut epochs = Epochs::new();
        epochs.add(Epoch::Epoch1, keys.account, epoch_link(b"epoch v1 block"));
        epochs.add(Epoch::Epoch2, keys.account, epoch_link(b"epoch v2 block"));
        Self {
            genesis,
            genesis_account: keys.account,
            genesis_amount: Amount::MAX,
            burn_account: Account::ZERO,
            epochs,
            bootstrap_weight_max_blocks: DEV_BOOTSTRAP_WEIGHT_MAX_BLOCKS,
        }
    }

    pub fn dev_genesis_keys() -> KeyPair {
        keypair_from_private(PrivateKey(DEV_GENESIS_PRIVATE_KEY))
    }
}

/// An epoch link is an ASCII tag, zero padded to 32 bytes.
fn epoch_link(tag: &[u8]) -> Link {
    let mut bytes = [0u8; 32];
    bytes[..tag.len()].copy_from_slice(tag);
    Link::new(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_is_an_open_of_the_genesis_account() {
        let constants = LedgerConstants::dev();
        assert_eq!(constants.genesis.account(), constants.genesis_account);
        assert_eq!(
            constants.genesis.source(),
            constants.genesis_account.as_link().as_block_hash()
        );
        assert!(constants.genesis.previous().is_zero());
    }

    #[test]
    fn epoch_links_are_distinct_and_signed_by_genesis() {
        let constants = LedgerConstants::dev();
        let v1 = constants.epochs.link(Epoch::Epoch1).unwrap();
        let v2 = constants.epochs.link(Epoch::Epoch2).unwrap();
        assert_ne!(v1, v2);
        assert_eq!(constants.epochs.signer(&v1), Some(constants.genesis_account));
        assert_eq!(constants.epochs.epoch(&v2), Some(Epoch::Epoch2));
        assert!(constants.epochs.link(Epoch::Epoch0).is_none());
    }
}
