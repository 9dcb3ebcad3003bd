//! 256-bit identifiers: block hashes, accounts, links and roots.
//!
//! All four share the same representation (32 raw bytes) but are distinct types
//! so that a block hash can never be passed where an account is expected. Explicit
//! conversions exist where the protocol reinterprets one as the other, e.g. a
//! state block's `link` is a destination account for sends and a source hash for
//! receives.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BlockDecodeError;

macro_rules! u256_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name([u8; 32]);

        impl $name {
            pub const ZERO: Self = Self([0u8; 32]);

            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; 32]
            }

            /// Reads the first 32 bytes of `bytes`.
            pub fn from_slice(bytes: &[u8]) -> Option<Self> {
                let array: [u8; 32] = bytes.get(..32)?.try_into().ok()?;
                Some(Self(array))
            }

            /// Parse a 64 character hex string.
            pub fn decode_hex(s: &str) -> Result<Self, BlockDecodeError> {
                let mut bytes = [0u8; 32];
                hex::decode_to_slice(s, &mut bytes)
                    .map_err(|e| BlockDecodeError::InvalidHex(e.to_string()))?;
                Ok(Self(bytes))
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl From<u64> for $name {
            /// Big-endian placement in the low 8 bytes; convenient for fixtures.
            fn from(value: u64) -> Self {
                let mut bytes = [0u8; 32];
                bytes[24..].copy_from_slice(&value.to_be_bytes());
                Self(bytes)
            }
        }

        impl FromStr for $name {
            type Err = BlockDecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::decode_hex(s)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}\u{2026})", stringify!($name), hex::encode(&self.0[..4]))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", hex::encode_upper(self.0))
            }
        }
    };
}

u256_type!(
    /// Hash of a block's hashable fields; identifies the block everywhere.
    BlockHash
);
u256_type!(
    /// An account is its Ed25519 public key.
    Account
);
u256_type!(
    /// State block link field: destination account, source hash, or an epoch sentinel.
    Link
);
u256_type!(
    /// The slot a block occupies: `previous` for chained blocks, the account for the first.
    Root
);

impl Account {
    pub fn as_link(&self) -> Link {
        Link(self.0)
    }
}

impl BlockHash {
    pub fn as_link(&self) -> Link {
        Link(self.0)
    }

    pub fn as_root(&self) -> Root {
        Root(self.0)
    }
}

impl Link {
    pub fn as_account(&self) -> Account {
        Account(self.0)
    }

    pub fn as_block_hash(&self) -> BlockHash {
        BlockHash(self.0)
    }
}

impl Root {
    pub fn as_account(&self) -> Account {
        Account(self.0)
    }

    pub fn as_block_hash(&self) -> BlockHash {
        BlockHash(self.0)
    }
}

impl From<BlockHash> for Root {
    fn from(hash: BlockHash) -> Self {
        Root(hash.0)
    }
}

impl From<Account> for Root {
    fn from(account: Account) -> Self {
        Root(account.0)
    }
}

/// `(root, previous)` pair. Two blocks are competing forks iff their qualified
/// roots are equal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QualifiedRoot {
    pub root: Root,
    pub previous: BlockHash,
}

impl QualifiedRoot {
    pub fn new(root: Root, previous: BlockHash) -> Self {
        Self { root, previous }
    }
}
