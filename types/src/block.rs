//! The five block variants and their binary encoding.
//!
//! Field order on the wire (hashables, then signature, then work):
//!
//! | type    | hashables                                                   | work |
//! |---------|-------------------------------------------------------------|------|
//! | send    | previous, destination, balance                              | LE   |
//! | receive | previous, source                                            | LE   |
//! | open    | source, representative, account                             | LE   |
//! | change  | previous, representative                                    | LE   |
//! | state   | account, previous, representative, balance, link            | BE   |
//!
//! Balances are 16 bytes big-endian. The work byte order differs between legacy and
//! state blocks and must be preserved for hash and wire compatibility.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    Account, Amount, BlockDecodeError, BlockHash, Link, QualifiedRoot, Root, Signature,
};

type Blake2b256 = Blake2b<U32>;

const SIGNATURE_SIZE: usize = 64;
const WORK_SIZE: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlockType {
    Invalid = 0,
    NotABlock = 1,
    Send = 2,
    Receive = 3,
    Open = 4,
    Change = 5,
    State = 6,
}

impl BlockType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(BlockType::Invalid),
            1 => Some(BlockType::NotABlock),
            2 => Some(BlockType::Send),
            3 => Some(BlockType::Receive),
            4 => Some(BlockType::Open),
            5 => Some(BlockType::Change),
            6 => Some(BlockType::State),
            _ => None,
        }
    }

    pub fn is_legacy(self) -> bool {
        matches!(
            self,
            BlockType::Send | BlockType::Receive | BlockType::Open | BlockType::Change
        )
    }

    /// Serialized size of a block of this type, excluding the type byte.
    pub fn serialized_size(self) -> usize {
        match self {
            BlockType::Send => SendBlock::SIZE,
            BlockType::Receive => ReceiveBlock::SIZE,
            BlockType::Open => OpenBlock::SIZE,
            BlockType::Change => ChangeBlock::SIZE,
            BlockType::State => StateBlock::SIZE,
            BlockType::Invalid | BlockType::NotABlock => 0,
        }
    }

    fn name(self) -> &'static str {
        match self {
            BlockType::Invalid => "invalid",
            BlockType::NotABlock => "not_a_block",
            BlockType::Send => "send",
            BlockType::Receive => "receive",
            BlockType::Open => "open",
            BlockType::Change => "change",
            BlockType::State => "state",
        }
    }
}

fn hash_parts(parts: &[&[u8]]) -> BlockHash {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    BlockHash::new(output)
}

/// Sequential reader over a serialized block; every read is bounds-checked up front.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(block_type: BlockType, bytes: &'a [u8]) -> Result<Self, BlockDecodeError> {
        let expected = block_type.serialized_size();
        if bytes.len() < expected {
            return Err(BlockDecodeError::Truncated {
                block_type: block_type.name(),
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self { bytes, pos: 0 })
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn hash(&mut self) -> BlockHash {
        BlockHash::new(self.take())
    }

    fn account(&mut self) -> Account {
        Account::new(self.take())
    }

    fn amount(&mut self) -> Amount {
        Amount::from_be_bytes(self.take())
    }

    fn signature(&mut self) -> Signature {
        Signature(self.take())
    }
}

// ── Send ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendHashables {
    pub previous: BlockHash,
    pub destination: Account,
    pub balance: Amount,
}

impl SendHashables {
    pub fn hash(&self) -> BlockHash {
        hash_parts(&[
            self.previous.as_bytes(),
            self.destination.as_bytes(),
            &self.balance.to_be_bytes(),
        ])
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendBlock {
    hashables: SendHashables,
    signature: Signature,
    work: u64,
    hash: BlockHash,
}

impl SendBlock {
    pub const SIZE: usize = 32 + 32 + 16 + SIGNATURE_SIZE + WORK_SIZE;

    pub fn new(hashables: SendHashables, signature: Signature, work: u64) -> Self {
        let hash = hashables.hash();
        Self {
            hashables,
            signature,
            work,
            hash,
        }
    }

    pub fn hashables(&self) -> &SendHashables {
        &self.hashables
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn work(&self) -> u64 {
        self.work
    }

    fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.hashables.previous.as_bytes());
        out.extend_from_slice(self.hashables.destination.as_bytes());
        out.extend_from_slice(&self.hashables.balance.to_be_bytes());
        out.extend_from_slice(self.signature.as_bytes());
        out.extend_from_slice(&self.work.to_le_bytes());
    }

    fn deserialize(bytes: &[u8]) -> Result<Self, BlockDecodeError> {
        let mut r = Reader::new(BlockType::Send, bytes)?;
        let hashables = SendHashables {
            previous: r.hash(),
            destination: r.account(),
            balance: r.amount(),
        };
        let signature = r.signature();
        let work = u64::from_le_bytes(r.take());
        Ok(Self::new(hashables, signature, work))
    }
}

// ── Receive ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiveHashables {
    pub previous: BlockHash,
    pub source: BlockHash,
}

impl ReceiveHashables {
    pub fn hash(&self) -> BlockHash {
        hash_parts(&[self.previous.as_bytes(), self.source.as_bytes()])
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiveBlock {
    hashables: ReceiveHashables,
    signature: Signature,
    work: u64,
    hash: BlockHash,
}

impl ReceiveBlock {
    pub const SIZE: usize = 32 + 32 + SIGNATURE_SIZE + WORK_SIZE;

    pub fn new(hashables: ReceiveHashables, signature: Signature, work: u64) -> Self {
        let hash = hashables.hash();
        Self {
            hashables,
            signature,
            work,
            hash,
        }
    }

    pub fn hashables(&self) -> &ReceiveHashables {
        &self.hashables
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn work(&self) -> u64 {
        self.work
    }

    fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.hashables.previous.as_bytes());
        out.extend_from_slice(self.hashables.source.as_bytes());
        out.extend_from_slice(self.signature.as_bytes());
        out.extend_from_slice(&self.work.to_le_bytes());
    }

    fn deserialize(bytes: &[u8]) -> Result<Self, BlockDecodeError> {
        let mut r = Reader::new(BlockType::Receive, bytes)?;
        let hashables = ReceiveHashables {
            previous: r.hash(),
            source: r.hash(),
        };
        let signature = r.signature();
        let work = u64::from_le_bytes(r.take());
        Ok(Self::new(hashables, signature, work))
    }
}

// ── Open ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenHashables {
    pub source: BlockHash,
    pub representative: Account,
    pub account: Account,
}

impl OpenHashables {
    pub fn hash(&self) -> BlockHash {
        hash_parts(&[
            self.source.as_bytes(),
            self.representative.as_bytes(),
            self.account.as_bytes(),
        ])
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenBlock {
    hashables: OpenHashables,
    signature: Signature,
    work: u64,
    hash: BlockHash,
}

impl OpenBlock {
    pub const SIZE: usize = 32 + 32 + 32 + SIGNATURE_SIZE + WORK_SIZE;

    pub fn new(hashables: OpenHashables, signature: Signature, work: u64) -> Self {
        let hash = hashables.hash();
        Self {
            hashables,
            signature,
            work,
            hash,
        }
    }

    pub fn hashables(&self) -> &OpenHashables {
        &self.hashables
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn work(&self) -> u64 {
        self.work
    }

    fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.hashables.source.as_bytes());
        out.extend_from_slice(self.hashables.representative.as_bytes());
        out.extend_from_slice(self.hashables.account.as_bytes());
        out.extend_from_slice(self.signature.as_bytes());
        out.extend_from_slice(&self.work.to_le_bytes());
    }

    fn deserialize(bytes: &[u8]) -> Result<Self, BlockDecodeError> {
        let mut r = Reader::new(BlockType::Open, bytes)?;
        let hashables = OpenHashables {
            source: r.hash(),
            representative: r.account(),
            account: r.account(),
        };
        let signature = r.signature();
        let work = u64::from_le_bytes(r.take());
        Ok(Self::new(hashables, signature, work))
    }
}

// ── Change ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeHashables {
    pub previous: BlockHash,
    pub representative: Account,
}

impl ChangeHashables {
    pub fn hash(&self) -> BlockHash {
        hash_parts(&[self.previous.as_bytes(), self.representative.as_bytes()])
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeBlock {
    hashables: ChangeHashables,
    signature: Signature,
    work: u64,
    hash: BlockHash,
}

impl ChangeBlock {
    pub const SIZE: usize = 32 + 32 + SIGNATURE_SIZE + WORK_SIZE;

    pub fn new(hashables: ChangeHashables, signature: Signature, work: u64) -> Self {
        let hash = hashables.hash();
        Self {
            hashables,
            signature,
            work,
            hash,
        }
    }

    pub fn hashables(&self) -> &ChangeHashables {
        &self.hashables
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn work(&self) -> u64 {
        self.work
    }

    fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.hashables.previous.as_bytes());
        out.extend_from_slice(self.hashables.representative.as_bytes());
        out.extend_from_slice(self.signature.as_bytes());
        out.extend_from_slice(&self.work.to_le_bytes());
    }

    fn deserialize(bytes: &[u8]) -> Result<Self, BlockDecodeError> {
        let mut r = Reader::new(BlockType::Change, bytes)?;
        let hashables = ChangeHashables {
            previous: r.hash(),
            representative: r.account(),
        };
        let signature = r.signature();
        let work = u64::from_le_bytes(r.take());
        Ok(Self::new(hashables, signature, work))
    }
}

// ── State ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateHashables {
    pub account: Account,
    pub previous: BlockHash,
    pub representative: Account,
    pub balance: Amount,
    pub link: Link,
}

impl StateHashables {
    /// 32-byte preamble whose last byte is the state type code, so a state block
    /// hash can never collide with a legacy block hash over the same bytes.
    fn preamble() -> [u8; 32] {
        let mut preamble = [0u8; 32];
        preamble[31] = BlockType::State.as_u8();
        preamble
    }

    pub fn hash(&self) -> BlockHash {
        hash_parts(&[
            &Self::preamble(),
            self.account.as_bytes(),
            self.previous.as_bytes(),
            self.representative.as_bytes(),
            &self.balance.to_be_bytes(),
            self.link.as_bytes(),
        ])
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateBlock {
    hashables: StateHashables,
    signature: Signature,
    work: u64,
    hash: BlockHash,
}

impl StateBlock {
    pub const SIZE: usize = 32 + 32 + 32 + 16 + 32 + SIGNATURE_SIZE + WORK_SIZE;

    pub fn new(hashables: StateHashables, signature: Signature, work: u64) -> Self {
        let hash = hashables.hash();
        Self {
            hashables,
            signature,
            work,
            hash,
        }
    }

    pub fn hashables(&self) -> &StateHashables {
        &self.hashables
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn work(&self) -> u64 {
        self.work
    }

    fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.hashables.account.as_bytes());
        out.extend_from_slice(self.hashables.previous.as_bytes());
        out.extend_from_slice(self.hashables.representative.as_bytes());
        out.extend_from_slice(&self.hashables.balance.to_be_bytes());
        out.extend_from_slice(self.hashables.link.as_bytes());
        out.extend_from_slice(self.signature.as_bytes());
        out.extend_from_slice(&self.work.to_be_bytes());
    }

    fn deserialize(bytes: &[u8]) -> Result<Self, BlockDecodeError> {
        let mut r = Reader::new(BlockType::State, bytes)?;
        let hashables = StateHashables {
            account: r.account(),
            previous: r.hash(),
            representative: r.account(),
            balance: r.amount(),
            link: Link::new(r.take()),
        };
        let signature = r.signature();
        let work = u64::from_be_bytes(r.take());
        Ok(Self::new(hashables, signature, work))
    }
}

// ── Block ───────────────────────────────────────────────────────────────

/// An immutable block of any variant. The hash is computed once at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Send(SendBlock),
    Receive(ReceiveBlock),
    Open(OpenBlock),
    Change(ChangeBlock),
    State(StateBlock),
}

impl Block {
    pub fn block_type(&self) -> BlockType {
        match self {
            Block::Send(_) => BlockType::Send,
            Block::Receive(_) => BlockType::Receive,
            Block::Open(_) => BlockType::Open,
            Block::Change(_) => BlockType::Change,
            Block::State(_) => BlockType::State,
        }
    }

    pub fn hash(&self) -> BlockHash {
        match self {
            Block::Send(b) => b.hash,
            Block::Receive(b) => b.hash,
            Block::Open(b) => b.hash,
            Block::Change(b) => b.hash,
            Block::State(b) => b.hash,
        }
    }

    /// Zero for open blocks and for the first block of a state chain.
    pub fn previous(&self) -> BlockHash {
        match self {
            Block::Send(b) => b.hashables.previous,
            Block::Receive(b) => b.hashables.previous,
            Block::Open(_) => BlockHash::ZERO,
            Block::Change(b) => b.hashables.previous,
            Block::State(b) => b.hashables.previous,
        }
    }

    /// The account embedded in the block. Legacy send, receive and change blocks
    /// do not carry one and report zero.
    pub fn account(&self) -> Account {
        match self {
            Block::Open(b) => b.hashables.account,
            Block::State(b) => b.hashables.account,
            _ => Account::ZERO,
        }
    }

    pub fn root(&self) -> Root {
        match self {
            Block::Open(b) => b.hashables.account.into(),
            Block::State(b) if b.hashables.previous.is_zero() => b.hashables.account.into(),
            _ => self.previous().into(),
        }
    }

    pub fn qualified_root(&self) -> QualifiedRoot {
        QualifiedRoot::new(self.root(), self.previous())
    }

    /// Source hash of a legacy receive or open; zero otherwise.
    pub fn source(&self) -> BlockHash {
        match self {
            Block::Receive(b) => b.hashables.source,
            Block::Open(b) => b.hashables.source,
            _ => BlockHash::ZERO,
        }
    }

    /// State block link; zero for legacy blocks.
    pub fn link(&self) -> Link {
        match self {
            Block::State(b) => b.hashables.link,
            _ => Link::ZERO,
        }
    }

    pub fn representative(&self) -> Option<Account> {
        match self {
            Block::Open(b) => Some(b.hashables.representative),
            Block::Change(b) => Some(b.hashables.representative),
            Block::State(b) => Some(b.hashables.representative),
            Block::Send(_) | Block::Receive(_) => None,
        }
    }

    /// Balance after this block, for the variants that carry one.
    pub fn balance(&self) -> Option<Amount> {
        match self {
            Block::Send(b) => Some(b.hashables.balance),
            Block::State(b) => Some(b.hashables.balance),
            _ => None,
        }
    }

    pub fn destination(&self) -> Option<Account> {
        match self {
            Block::Send(b) => Some(b.hashables.destination),
            _ => None,
        }
    }

    pub fn signature(&self) -> &Signature {
        match self {
            Block::Send(b) => &b.signature,
            Block::Receive(b) => &b.signature,
            Block::Open(b) => &b.signature,
            Block::Change(b) => &b.signature,
            Block::State(b) => &b.signature,
        }
    }

    pub fn work(&self) -> u64 {
        match self {
            Block::Send(b) => b.work,
            Block::Receive(b) => b.work,
            Block::Open(b) => b.work,
            Block::Change(b) => b.work,
            Block::State(b) => b.work,
        }
    }

    /// Whether a block of this variant may directly follow a block of `previous`.
    /// Legacy blocks only chain onto legacy blocks; state blocks chain onto anything.
    pub fn valid_predecessor(&self, previous: BlockType) -> bool {
        match self {
            Block::Send(_) | Block::Receive(_) | Block::Change(_) => previous.is_legacy(),
            Block::Open(_) => false,
            Block::State(_) => true,
        }
    }

    pub fn serialize(&self, out: &mut Vec<u8>) {
        match self {
            Block::Send(b) => b.serialize(out),
            Block::Receive(b) => b.serialize(out),
            Block::Open(b) => b.serialize(out),
            Block::Change(b) => b.serialize(out),
            Block::State(b) => b.serialize(out),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.block_type().serialized_size());
        self.serialize(&mut out);
        out
    }

    pub fn deserialize(block_type: BlockType, bytes: &[u8]) -> Result<Self, BlockDecodeError> {
        match block_type {
            BlockType::Send => SendBlock::deserialize(bytes).map(Block::Send),
            BlockType::Receive => ReceiveBlock::deserialize(bytes).map(Block::Receive),
            BlockType::Open => OpenBlock::deserialize(bytes).map(Block::Open),
            BlockType::Change => ChangeBlock::deserialize(bytes).map(Block::Change),
            BlockType::State => StateBlock::deserialize(bytes).map(Block::State),
            BlockType::Invalid | BlockType::NotABlock => {
                Err(BlockDecodeError::UnknownType(block_type.as_u8()))
            }
        }
    }

    /// Type byte followed by the serialized block.
    pub fn to_typed_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.block_type().serialized_size());
        out.push(self.block_type().as_u8());
        self.serialize(&mut out);
        out
    }

    /// Decode a type byte followed by a block. Returns the block and the number of
    /// bytes consumed so callers can read trailing data such as a sideband.
    pub fn from_typed_bytes(bytes: &[u8]) -> Result<(Self, usize), BlockDecodeError> {
        let (&code, rest) = bytes.split_first().ok_or(BlockDecodeError::Empty)?;
        let block_type = BlockType::from_u8(code).ok_or(BlockDecodeError::UnknownType(code))?;
        let block = Self::deserialize(block_type, rest)?;
        Ok((block, 1 + block_type.serialized_size()))
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_typed_bytes().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        Block::from_typed_bytes(&bytes)
            .map(|(block, _)| block)
            .map_err(serde::de::Error::custom)
    }
}
