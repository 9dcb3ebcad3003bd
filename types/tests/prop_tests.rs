use proptest::prelude::*;

use lattice_types::{
    Account, Amount, Block, BlockHash, BlockType, Link, Signature, StateBlock, StateHashables,
};

fn arb_state() -> impl Strategy<Value = Block> {
    (
        prop::array::uniform32(0u8..),
        prop::array::uniform32(0u8..),
        prop::array::uniform32(0u8..),
        any::<u128>(),
        prop::array::uniform32(0u8..),
        any::<u64>(),
    )
        .prop_map(|(account, previous, representative, balance, link, work)| {
            Block::State(StateBlock::new(
                StateHashables {
                    account: Account::new(account),
                    previous: BlockHash::new(previous),
                    representative: Account::new(representative),
                    balance: Amount::raw(balance),
                    link: Link::new(link),
                },
                Signature([0x5a; 64]),
                work,
            ))
        })
}

proptest! {
    /// BlockHash::is_zero is true only for all-zero bytes.
    #[test]
    fn block_hash_is_zero_correct(bytes in prop::array::uniform32(0u8..)) {
        let hash = BlockHash::new(bytes);
        prop_assert_eq!(hash.is_zero(), bytes == [0u8; 32]);
    }

    /// Decoding a state block recomputes the same hash it was encoded with.
    #[test]
    fn state_block_decode_preserves_hash(block in arb_state()) {
        let bytes = block.to_bytes();
        let decoded = Block::deserialize(BlockType::State, &bytes).unwrap();
        prop_assert_eq!(decoded.hash(), block.hash());
        prop_assert_eq!(decoded.work(), block.work());
    }

    /// Any strict prefix of a serialized block fails to decode instead of panicking.
    #[test]
    fn truncated_state_block_never_panics(block in arb_state(), cut in 0usize..216) {
        let bytes = block.to_bytes();
        prop_assert!(Block::deserialize(BlockType::State, &bytes[..cut]).is_err());
    }

    /// Amount big-endian encoding is order preserving.
    #[test]
    fn amount_encoding_orders(a in any::<u128>(), b in any::<u128>()) {
        let ea = Amount::raw(a).to_be_bytes();
        let eb = Amount::raw(b).to_be_bytes();
        prop_assert_eq!(a.cmp(&b), ea.cmp(&eb));
    }
}
